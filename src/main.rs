mod app;
mod camera;
mod error;
mod input;
mod mesh;
mod noise;
mod render;
mod scene;
mod texture;

use std::env;
use std::time::Duration;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 540;

/// The argument following a value flag, or an error when the flag is last.
fn flag_value(args: &[String], i: usize) -> Result<&str, Box<dyn std::error::Error>> {
    return args
        .get(i + 1)
        .map(|value| value.as_str())
        .ok_or_else(|| format!("missing value after {}", args[i]).into());
}

#[show_image::main]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Default values.
    let mut width = WIDTH;
    let mut height = HEIGHT;
    let mut scene_name = String::from("spheres");
    let mut texture_path: Option<String> = None;
    let mut print_stats = false;

    let args: Vec<String> = env::args().collect();
    for i in 1..args.len() {
        match args[i].as_str() {
            "-w" => { width = flag_value(&args, i)?.parse()?; }
            "-h" => { height = flag_value(&args, i)?.parse()?; }
            "-s" => { scene_name = flag_value(&args, i)?.to_string(); }
            "-t" => { texture_path = Some(flag_value(&args, i)?.to_string()); }
            "--stats" => { print_stats = true; }
            _ => ()
        }
    }

    let params = app::Params {
        width,
        height,
        print_stats,
        scene_name,
        texture_path,
        tick_interval: Duration::from_millis(16),
    };

    app::run(params)?;

    return Ok(());
}
