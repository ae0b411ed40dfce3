#![allow(dead_code)]

pub mod database;
pub mod panel;
