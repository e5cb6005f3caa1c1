//! Wobble Grid entry point
//!
//! On the web this installs the soft-body world for the editor. Natively it
//! runs a short headless simulation and prints how a poked body settles.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

    log::info!("Wobble Grid starting...");
    if wobble_grid::platform::web::install().is_none() {
        log::error!("No window; soft-body world not installed");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Wobble Grid (native) starting...");
    log::info!("The editor runs in the browser - this is a headless demo");

    run_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn run_demo() {
    use glam::DVec2;
    use wobble_grid::cell_center;
    use wobble_grid::sim::{CellKey, FixedStepDriver, OffsetBuffer, SoftBodyWorld};
    use wobble_grid::Settings;

    let settings = Settings::load();
    let mut world = SoftBodyWorld::from_settings(&settings);
    let mut sink = OffsetBuffer::new();
    let mut driver = FixedStepDriver::default();

    // 4x3 slab of cells
    let keys: Vec<CellKey> = (0..4)
        .flat_map(|x| (0..3).map(move |y| CellKey::new(x, y)))
        .collect();
    let Some(id) = world.group_keys(keys.iter().copied()) else {
        return;
    };

    let origin = cell_center(1, 1, world.cell_size(), DVec2::ZERO);
    world.impulse_at_keys(keys.iter().copied(), origin, settings.effective_impulse_strength());

    println!("\nPoked {} at cell (1,1):", id);
    println!("{:>6}  {:>10}", "frame", "max offset");
    for frame in 1..=180 {
        driver.frame(&mut world, &mut sink);
        if frame % 20 == 0 {
            println!("{:>6}  {:>10.4}", frame, sink.max_offset());
        }
    }

    world.remove_keys(keys);
    let outcome = driver.frame(&mut world, &mut sink);
    println!("\nAfter removing every cell: {:?} ({} cells reset)", outcome, sink.cleared);
}
