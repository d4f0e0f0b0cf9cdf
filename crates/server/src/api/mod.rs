//! Route handlers.

mod descontos;
mod health;

pub use descontos::{desconto_calculado, desconto_realizado, tabela_de_variaveis};
pub use health::{health, teste};

#[cfg(test)]
mod tests;
