use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use skyburst::config::Config;
use skyburst::input::{InputEvent, Tunable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    Resize(u16, u16),
    Input(InputEvent),
}

/// Maps a terminal event onto the simulation's input vocabulary. Toggles and
/// steps are computed from the current `config`.
pub fn translate(event: &Event, config: &Config, cols: u16, rows: u16) -> Option<Action> {
    match event {
        Event::Key(key) => translate_key(key, config),
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(Action::Input(InputEvent::Click {
            ndc_x: to_ndc(*column, cols),
            ndc_y: -to_ndc(*row, rows),
        })),
        Event::Resize(cols, rows) => Some(Action::Resize(*cols, *rows)),
        _ => None,
    }
}

fn translate_key(key: &KeyEvent, config: &Config) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let tune = |t| Some(Action::Input(InputEvent::Tune(t)));
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::Input(InputEvent::LaunchOne)),
        KeyCode::Char('f') => Some(Action::Input(InputEvent::LaunchFinale)),
        KeyCode::Char('a') => tune(Tunable::AutoLaunch(!config.auto_launch)),
        KeyCode::Char('m') => tune(Tunable::FinaleMode(!config.finale_mode)),
        KeyCode::Char('s') => tune(Tunable::SoundEnabled(!config.sound_enabled)),
        KeyCode::Char('k') => tune(Tunable::SmokeEnabled(!config.smoke_enabled)),
        KeyCode::Char('+') | KeyCode::Char('=') => tune(Tunable::Volume(config.volume + 0.1)),
        KeyCode::Char('-') => tune(Tunable::Volume(config.volume - 0.1)),
        KeyCode::Char('[') => tune(Tunable::LaunchInterval(config.launch_interval - 500.0)),
        KeyCode::Char(']') => tune(Tunable::LaunchInterval(config.launch_interval + 500.0)),
        KeyCode::Char('p') => tune(Tunable::ParticleCount(config.particle_count.saturating_sub(1000))),
        KeyCode::Char('P') => tune(Tunable::ParticleCount(config.particle_count + 1000)),
        KeyCode::Char('z') => tune(Tunable::ParticleSize(config.particle_size - 0.1)),
        KeyCode::Char('Z') => tune(Tunable::ParticleSize(config.particle_size + 0.1)),
        KeyCode::Char('e') => tune(Tunable::ExplosionForce(config.explosion_force - 0.5)),
        KeyCode::Char('E') => tune(Tunable::ExplosionForce(config.explosion_force + 0.5)),
        KeyCode::Char('g') => tune(Tunable::Gravity(config.gravity - 0.001)),
        KeyCode::Char('G') => tune(Tunable::Gravity(config.gravity + 0.001)),
        KeyCode::Char('h') => tune(Tunable::HoverDuration(config.hover_duration - 0.1)),
        KeyCode::Char('H') => tune(Tunable::HoverDuration(config.hover_duration + 0.1)),
        KeyCode::Up => tune(Tunable::WindStrength(config.wind_strength + 0.1)),
        KeyCode::Down => tune(Tunable::WindStrength(config.wind_strength - 0.1)),
        KeyCode::Left => tune(Tunable::WindDirection(config.wind_direction - 15.0)),
        KeyCode::Right => tune(Tunable::WindDirection(config.wind_direction + 15.0)),
        _ => None,
    }
}

fn to_ndc(cell: u16, extent: u16) -> f32 {
    if extent <= 1 {
        return 0.0;
    }
    cell as f32 / (extent - 1) as f32 * 2.0 - 1.0
}
