use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use storm_arena::config::{ArenaConfig, Cli};
use storm_arena::display::{self, Labels, Surface};
use storm_arena::engine::BattleEngine;
use storm_arena::error::ArenaError;
use storm_arena::random::{RandomSource, RngSource};

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Battle,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &ArenaConfig,
) -> std::io::Result<MenuResult> {
    out.queue(style::ResetColor)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let lines: &[(String, Color)] = &[
        ("⚡  STORM  ARENA  ⚡".to_string(), Color::Cyan),
        (String::new(), Color::White),
        (format!("{}  vs  {}", config.player_name, config.enemy_name), Color::White),
        (String::new(), Color::White),
        ("[ENTER] Battle     [Q] Quit".to_string(), Color::DarkGrey),
    ];

    for (i, (text, color)) in lines.iter().enumerate() {
        let row = cy.saturating_sub(3) + i as u16;
        out.queue(cursor::MoveTo(
            cx.saturating_sub(text.chars().count() as u16 / 2),
            row,
        ))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(text))?;
    }
    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Battle),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            },
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Battle screen ─────────────────────────────────────────────────────────────

enum ScreenExit {
    Menu,
    Quit,
}

fn random_streams(seed: Option<u64>) -> (Box<dyn RandomSource>, Box<dyn RandomSource>) {
    match seed {
        Some(seed) => (
            Box::new(RngSource(StdRng::seed_from_u64(seed))),
            Box::new(RngSource(StdRng::seed_from_u64(seed.wrapping_add(1)))),
        ),
        None => (
            Box::new(RngSource(StdRng::from_entropy())),
            Box::new(RngSource(StdRng::from_entropy())),
        ),
    }
}

/// Mount the engine, run the frame loop until the player leaves, unmount.
fn battle_screen<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &ArenaConfig,
) -> std::io::Result<ScreenExit> {
    let (rolls, cosmetic) = random_streams(config.seed);
    let mut engine = BattleEngine::mount(Surface::probe(), rolls, cosmetic);
    if !engine.is_rendering() {
        warn!("no usable drawing surface, battle not started");
        engine.unmount();
        return Ok(ScreenExit::Menu);
    }

    let labels = Labels {
        player_name: config.player_name.clone(),
        enemy_name: config.enemy_name.clone(),
        show_controls: config.show_controls,
    };
    let frame = config.frame_duration();
    let mounted_at = Instant::now();
    let mut ended = false;

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let exit = 'frames: loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) => {
                    match code {
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            break 'frames ScreenExit::Quit;
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            break 'frames ScreenExit::Menu;
                        }
                        KeyCode::Enter if ended => break 'frames ScreenExit::Menu,
                        KeyCode::Char(' ') => {
                            engine.start_combo();
                        }
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    engine.resize(cols, rows);
                    out.queue(terminal::Clear(terminal::ClearType::All))?;
                }
                _ => {}
            }
        }

        // Choreography timers run on wall time since mount.
        let now_ms = mounted_at.elapsed().as_millis() as u64;
        engine.advance(now_ms.saturating_sub(engine.clock_ms()));
        engine.tick();

        if let Some(outcome) = engine.take_outcome() {
            info!(?outcome, "battle ended");
            ended = true;
        }

        if let (Some(scene), Some(surface)) = (engine.scene(), engine.surface()) {
            display::render(out, &scene, surface, &labels)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    };

    engine.unmount();
    Ok(exit)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), ArenaError> {
    let cli = Cli::parse();
    let _log_guard = storm_arena::logging::init();
    let config = ArenaConfig::load().with_overrides(&cli);
    info!(?config, "starting");

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the frame loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &config);

    // Always restore the terminal
    let _ = out.execute(style::ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    Ok(result?)
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &ArenaConfig,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx, config)? {
            MenuResult::Quit => break,
            MenuResult::Battle => match battle_screen(out, rx, config)? {
                ScreenExit::Quit => break,
                ScreenExit::Menu => {}
            },
        }
    }
    Ok(())
}
