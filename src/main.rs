#[macro_use]
extern crate log;

use log::LevelFilter;
use red_black_collections::red_black_tree::{RedBlackMap, RedBlackSet};
use simplelog::{Config, SimpleLogger};
use std::env;

fn main() {
    let level = match env::args().nth(1).as_ref().map(String::as_str) {
        Some("-v") => LevelFilter::Debug,
        Some("-vv") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    if let Err(err) = SimpleLogger::init(level, Config::default()) {
        eprintln!("failed to initialize logger: {}", err);
    }

    let mut set = RedBlackSet::new();
    for key in &[20, 15, 25, 10, 5, 1, 30, 35] {
        set.insert(*key);
    }
    info!("plain tree holds {} keys, height {}", set.len(), set.height());
    set.print_tree();

    let mut map = RedBlackMap::new();
    for key in &[20, 15, 25, 10, 5, 1, 30, 35] {
        map.insert(*key, format!("Value {}", key));
    }
    map.print_tree();

    for key in &[15, 100] {
        match map.search(key) {
            Some(value) => println!("search {}: {}", key, value),
            None => println!("search {}: not found", key),
        }
    }
}
