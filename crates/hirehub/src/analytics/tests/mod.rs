mod common;
mod dashboard;
mod trends;
