pub mod chunker;
pub mod config;
pub mod error;
pub mod front_matter;
pub mod gateway;
pub mod i18n;
pub mod ledger;
pub mod openai;
pub mod placeholder;
pub mod runner;
pub mod settings;
pub mod translator;
