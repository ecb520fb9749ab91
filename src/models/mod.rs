pub mod insomnia;
pub mod postman;
