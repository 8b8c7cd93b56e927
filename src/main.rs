use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use pixels::{Pixels, SurfaceTexture};
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, source::SquareWave};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey},
    window::{Window, WindowId},
};

use chip_eight::{Cpu, DISPLAY_X, DISPLAY_Y, Quirks, UnknownOpcodePolicy, VmOptions, u4};

/// The audio collaborator owns sound-timer decay, at the nominal 60Hz.
const SOUND_TIMER_HZ: f32 = 60.0;
const SOUND_TIMER_TIME_STEP: f32 = 1.0 / SOUND_TIMER_HZ;

/// Mapping from physical keyboard keys to the hex keypad, in the QWERTY
/// row order of the reference machine.
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::Digit1, // 0x0
    KeyCode::Digit2, // 0x1
    KeyCode::Digit3, // 0x2
    KeyCode::Digit4, // 0x3
    KeyCode::KeyQ,   // 0x4
    KeyCode::KeyW,   // 0x5
    KeyCode::KeyE,   // 0x6
    KeyCode::KeyR,   // 0x7
    KeyCode::KeyA,   // 0x8
    KeyCode::KeyS,   // 0x9
    KeyCode::KeyD,   // 0xA
    KeyCode::KeyF,   // 0xB
    KeyCode::KeyZ,   // 0xC
    KeyCode::KeyX,   // 0xD
    KeyCode::KeyC,   // 0xE
    KeyCode::KeyV,   // 0xF
];

struct App {
    pixels: Option<Pixels<'static>>,
    window: Option<Arc<Window>>,

    /// Audio output stream (must be kept alive).
    _audio_stream: OutputStream,
    audio_sink: Sink,
    /// Accumulates frame time toward the next sound-timer tick.
    sound_dt_accumulator: f32,

    cpu: Cpu,
    /// Used for delta time calculation.
    last_frame_instant: Instant,

    /// Stores the result of the application to be returned from main.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(rom: &[u8], options: VmOptions) -> anyhow::Result<Self> {
        // Initialize audio
        let mut _audio_stream = OutputStreamBuilder::open_default_stream()
            .context("Failed to open audio output stream")?;
        _audio_stream.log_on_drop(false);

        let audio_sink = Sink::connect_new(_audio_stream.mixer());
        audio_sink.pause();
        audio_sink.append(SquareWave::new(440.0).amplify(0.5));

        // Initialize the virtual machine
        let mut cpu = Cpu::new(options);
        cpu.load(rom).context("Failed to load ROM into memory")?;

        Ok(Self {
            pixels: None,
            window: None,

            _audio_stream,
            audio_sink,
            sound_dt_accumulator: 0.0,

            cpu,
            last_frame_instant: Instant::now(),
            exit_result: Ok(()),
        })
    }

    fn present_display(&mut self) {
        let buff = self.pixels.as_mut().unwrap().frame_mut();

        for (i, pxl) in buff.chunks_exact_mut(4).enumerate() {
            let x = i % DISPLAY_X;
            let y = i / DISPLAY_X;

            let rgba = if self.cpu.pixel(x, y) {
                [0xFF, 0xFF, 0xFF, 0xFF]
            } else {
                [0x00, 0x00, 0x00, 0xFF]
            };
            pxl.copy_from_slice(&rgba);
        }
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = {
            let size = LogicalSize::new(640, 480);
            let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title("chip-eight")
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        self.window = Some(window.clone());
        self.pixels = {
            let window_size = window.inner_size();
            let surface_texture =
                SurfaceTexture::new(window_size.width, window_size.height, window.clone());

            let pixels = Pixels::new(DISPLAY_X as u32, DISPLAY_Y as u32, surface_texture)
                .context("Failed to create pixels surface")?;

            window.request_redraw();
            Some(pixels)
        };

        // Avoid large dt on first frame
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                self.pixels
                    .as_mut()
                    .unwrap()
                    .resize_surface(size.width, size.height)
                    .context("Failed to resize pixels surface")?;
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame_instant).as_secs_f32();
                self.last_frame_instant = now;

                // One instruction per presented frame, like the reference
                // loop. The delay timer decays inside the cycle; the sound
                // timer decays here, at the audio cadence.
                self.cpu.step().context("Execution error")?;

                self.sound_dt_accumulator += dt;
                while self.sound_dt_accumulator >= SOUND_TIMER_TIME_STEP {
                    self.sound_dt_accumulator -= SOUND_TIMER_TIME_STEP;
                    self.cpu.decay_sound_timer();
                }

                if self.cpu.should_beep() {
                    self.audio_sink.play();
                } else {
                    self.audio_sink.pause();
                }

                self.present_display();

                self.pixels
                    .as_ref()
                    .unwrap()
                    .render()
                    .context("Pixels render error")?;

                self.window.as_ref().unwrap().request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => match event.state {
                ElementState::Pressed => {
                    if let Some(key) = KEY_MAP.iter().position(|&k| k == event.physical_key) {
                        self.cpu.set_key(u4::new(key as u8), true);
                    }
                }
                ElementState::Released => {
                    if let Some(key) = KEY_MAP.iter().position(|&k| k == event.physical_key) {
                        self.cpu.set_key(u4::new(key as u8), false);
                    }
                }
            },

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QuirksArg {
    /// Reproduce the reference machine bug-for-bug.
    Reference,
    /// Canonical CHIP-8 semantics.
    Canonical,
}

impl From<QuirksArg> for Quirks {
    fn from(arg: QuirksArg) -> Quirks {
        match arg {
            QuirksArg::Reference => Quirks::Reference,
            QuirksArg::Canonical => Quirks::Canonical,
        }
    }
}

/// CHIP-8 emulator.
///
/// Keys 1-4, Q-R, A-F, Z-V map to the hex keypad.
/// Escape is used to exit the emulator.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,

    /// Instruction semantics for the opcodes where the reference machine
    /// deviates from canonical CHIP-8
    #[arg(long, value_enum, default_value = "reference")]
    quirks: QuirksArg,

    /// Fail on unknown opcodes instead of ignoring them
    #[arg(long)]
    strict_opcodes: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = std::fs::read(&args.rom_path).context("Failed to read ROM file")?;

    let options = VmOptions {
        quirks: args.quirks.into(),
        unknown_opcode: if args.strict_opcodes {
            UnknownOpcodePolicy::Fail
        } else {
            UnknownOpcodePolicy::Ignore
        },
    };

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&rom, options).context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    // Return the result captured during the event loop
    app.exit_result
}
