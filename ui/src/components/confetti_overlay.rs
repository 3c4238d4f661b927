use dioxus::prelude::*;

use atm_common::confetti::{burst, ConfettiConfig, Particle};

use super::atm_state::use_atm_state;

#[cfg(target_family = "wasm")]
async fn linger(millis: u32) {
    gloo_timers::future::TimeoutFuture::new(millis).await;
}

#[cfg(not(target_family = "wasm"))]
async fn linger(_millis: u32) {}

fn particle_style(particle: &Particle, config: &ConfettiConfig) -> String {
    let (dx, dy) = particle.displacement(config.gravity_px);
    let size = particle.size_px;
    format!(
        "--dx: {dx:.1}px; --dy: {dy:.1}px; background: {}; width: {size:.1}px; height: {:.1}px; \
         animation-duration: {}ms; animation-delay: {}ms;",
        particle.color,
        size * 0.6,
        config.duration_millis,
        particle.delay_millis,
    )
}

/// One burst per confirmed write, cleared once the animation has played.
#[component]
pub fn ConfettiOverlay() -> Element {
    let state = use_atm_state();
    let config = use_hook(ConfettiConfig::default);
    let mut showing = use_signal(|| None::<u32>);
    let celebrations = use_memo(move || state.read().celebrations);

    let duration = config.duration_millis;
    use_effect(move || {
        let burst_id = celebrations();
        if burst_id == 0 {
            return;
        }
        showing.set(Some(burst_id));
        spawn(async move {
            linger(duration).await;
            // A newer burst owns the overlay now.
            if *showing.peek() == Some(burst_id) {
                showing.set(None);
            }
        });
    });

    let Some(burst_id) = showing() else {
        return rsx! {};
    };
    let pieces: Vec<String> = burst(u64::from(burst_id), &config)
        .iter()
        .map(|p| particle_style(p, &config))
        .collect();
    let top = config.origin_y * 100.0;

    rsx! {
        div { class: "confetti", style: "top: {top}vh;",
            for (i, piece) in pieces.into_iter().enumerate() {
                span { key: "{i}", style: "{piece}" }
            }
        }
    }
}
