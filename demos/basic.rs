// Example: mount, scroll, and feed back real item sizes.
use virtual_list_engine::{Align, Axis, Engine, Options, Rect, ScrollToItemOptions};

fn main() -> Result<(), virtual_list_engine::ConfigError> {
    let options = Options::new(1_000_000, 24.0)
        .with_overscan(4)
        .with_on_reach_end(|e| println!("reach_end index={} offset={}", e.index, e.offset));
    let mut engine = Engine::new(options)?;

    engine.mount(|axis: Axis, offset: f64| println!("host scroll {axis:?} -> {offset}"))?;
    engine.on_resize(Rect::new(320.0, 240.0))?;
    engine.on_scroll(123_456.0)?;

    let state = engine.state();
    println!("total_size={}", state.size());
    println!(
        "rendered={:?}..={:?}",
        state.items().first().map(|it| it.index),
        state.items().last().map(|it| it.index)
    );

    // Pretend the host laid out every rendered item and found them taller than estimated.
    let tokens: Vec<_> = engine.items().iter().map(|it| it.token()).collect();
    for token in tokens {
        engine.on_item_resize(token, 30.0)?;
    }
    println!("after measuring: offset={}", engine.scroll_offset());

    engine.scroll_to_item(ScrollToItemOptions::new(999_999, Align::End), None)?;
    for frame in 1..=8 {
        engine.on_frame(frame as f64 * 16.0)?;
    }
    println!("after scroll_to_item: offset={}", engine.scroll_offset());
    Ok(())
}
