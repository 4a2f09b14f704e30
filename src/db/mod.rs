pub mod laposte;
pub mod prod_db;
pub mod trocvelo;
