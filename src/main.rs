use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::Rng;
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use wavemaze::{generate, solve, Blocked, Cell, Grid, MazeError, Outcome, Pos, Solution};

const DEFAULT_ROWS: usize = 15;
const DEFAULT_COLS: usize = 15;
const DEFAULT_RENDER_FPS: u64 = 30;
const CELL_W: usize = 2;

struct Settings {
    rows: usize,
    cols: usize,
    random_exit: bool,
    render_fps: u64,
}

fn read_settings() -> Settings {
    let rows = std::env::var("MAZE_ROWS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_ROWS);
    let cols = std::env::var("MAZE_COLS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_COLS);
    let random_exit = std::env::var("MAZE_RANDOM_EXIT")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let render_fps = std::env::var("MAZE_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    Settings {
        rows,
        cols,
        random_exit,
        render_fps,
    }
}

struct View {
    rows: usize,
    cols: usize,
    random_exit: bool,
    maze: Grid,
    solution: Solution,
    display: Grid,
    show_path: bool,
    show_wave: bool,
}

impl View {
    fn new(
        rows: usize,
        cols: usize,
        random_exit: bool,
        rng: &mut impl Rng,
    ) -> Result<View, MazeError> {
        let maze = generate(rows, cols, random_exit, rng)?;
        let solution = solve(&maze)?;
        let display = maze.clone();
        let mut view = View {
            rows,
            cols,
            random_exit,
            maze,
            solution,
            display,
            show_path: true,
            show_wave: false,
        };
        view.refresh();
        Ok(view)
    }

    fn regenerate(&mut self, rng: &mut impl Rng) -> Result<(), MazeError> {
        self.maze = generate(self.rows, self.cols, self.random_exit, rng)?;
        self.solution = solve(&self.maze)?;
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        let base = if self.show_wave {
            self.solution.labeled.clone()
        } else {
            self.maze.clone()
        };
        self.display = if self.show_path {
            base.overlay_path(self.solution.path())
        } else {
            base
        };
    }

    fn status(&self) -> String {
        match &self.solution.outcome {
            Outcome::Path(path) => format!("path: {} cells", path.len()),
            Outcome::NoPath(Blocked::ExitCount(n)) => format!("no path: {} exits", n),
            Outcome::NoPath(Blocked::Encircled(pos)) => {
                format!("no path: exit ({}, {}) walled in", pos.row, pos.col)
            }
            Outcome::NoPath(Blocked::Exhausted) => "no path: far exit unreachable".to_string(),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Wall,
    Floor,
    Exit,
    Wave,
}

#[derive(Clone, Copy, PartialEq)]
struct ScreenCell {
    glyph: Glyph,
    color: Color,
}

struct Renderer {
    last: Vec<ScreenCell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            last: vec![
                ScreenCell {
                    glyph: Glyph::Floor,
                    color: Color::Reset,
                };
                rows * cols
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout) -> io::Result<()> {
    let settings = read_settings();
    let mut rng = rand::thread_rng();
    let mut view = View::new(
        settings.rows,
        settings.cols,
        settings.random_exit,
        &mut rng,
    )
    .map_err(to_io)?;
    let mut renderer = Renderer::new(settings.rows, settings.cols);
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('n') => view.regenerate(&mut rng).map_err(to_io)?,
                        KeyCode::Char('s') => {
                            view.show_path = !view.show_path;
                            view.refresh();
                        }
                        KeyCode::Char('w') => {
                            view.show_wave = !view.show_wave;
                            view.refresh();
                        }
                        _ => {}
                    },
                    _ => {}
                }
            }
        }

        render(stdout, &view, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn to_io(err: MazeError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

fn render(stdout: &mut Stdout, view: &View, renderer: &mut Renderer) -> io::Result<()> {
    let needed_h = (view.rows + 2) as u16;
    let needed_w = (view.cols * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = format!(
        "{}x{} maze  {}  (n new, s path, w wave, q quit)",
        view.rows,
        view.cols,
        view.status()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for row in 0..view.rows {
        for col in 0..view.cols {
            let cell = screen_cell(view.display.get(Pos { row, col }));
            let idx = row * view.cols + col;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, col, row, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn screen_cell(cell: Cell) -> ScreenCell {
    match cell {
        Cell::Wall => ScreenCell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
        Cell::Open => ScreenCell {
            glyph: Glyph::Floor,
            color: Color::Reset,
        },
        Cell::Exit => ScreenCell {
            glyph: Glyph::Exit,
            color: Color::Magenta,
        },
        Cell::Step(_) => ScreenCell {
            glyph: Glyph::Wave,
            color: Color::DarkGrey,
        },
    }
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    col: usize,
    row: usize,
    cell: ScreenCell,
) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Wall => "██",
        Glyph::Floor => "  ",
        Glyph::Exit => "╳ ",
        Glyph::Wave => "· ",
    };
    let x_pos = renderer.origin_x + (col * CELL_W) as u16;
    let y_pos = renderer.origin_y + row as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
