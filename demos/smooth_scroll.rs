// Example: a host loop driving a smooth scroll_to_item frame by frame.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use virtual_list_engine::{
    Align, Axis, Easing, Engine, Options, Rect, ScrollDuration, ScrollToItemOptions,
};

fn main() -> Result<(), virtual_list_engine::ConfigError> {
    let options = Options::with_size_fn(10_000, |index, _| if index % 10 == 0 { 40.0 } else { 20.0 })
        .with_easing(Easing::EaseInOutCubic)
        .with_duration(ScrollDuration::Fixed(240.0));
    let mut engine = Engine::new(options)?;
    engine.mount(|_: Axis, _: f64| {})?;
    engine.on_resize(Rect::new(400.0, 300.0))?;

    let done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&done);
    engine.scroll_to_item(
        ScrollToItemOptions::new(2_000, Align::Center).with_smooth(true),
        Some(Box::new(move || flag.store(true, Ordering::SeqCst))),
    )?;

    let mut now_ms = 0.0;
    let mut frame = 0u32;
    while !done.load(Ordering::SeqCst) && frame < 600 {
        // Simulate a 60fps tick.
        now_ms += 16.0;
        frame += 1;
        engine.on_frame(now_ms)?;

        if frame % 3 == 0 {
            let items = engine.items();
            println!(
                "t={now_ms}ms off={:.1} first={:?} last={:?} scrolling_to={}",
                engine.scroll_offset(),
                items.first().map(|it| it.index),
                items.last().map(|it| it.index),
                engine.is_scrolling_to(),
            );
        }
    }
    println!("done after {frame} frames, offset={}", engine.scroll_offset());
    Ok(())
}
