mod common;
mod service;
mod standards;
