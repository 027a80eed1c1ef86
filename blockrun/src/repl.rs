//! Interactive block editor and runner
//!
//! The REPL is a text view over a canvas of block units. Commands build
//! blocks from typed entries and palette items, splice them into each other
//! through slot paths, and run the whole canvas through a `RunSession`:
//! - `/new`, `/assign` and `/palette` place fresh blocks on the canvas
//! - `/drop` and `/detach` move subtrees between units
//! - `/run` executes every unit in run order and prints the wrapped output
//! - `/trace`, `/turtle` and `/vars` inspect what the last run left behind

use blockrun_blocks::{
    parse_entry, parse_palette_item, parse_slot_path, Block, EditError, EntryMode, ParseError,
    Placement, Program, UnitId,
};
use blockrun_interpreter::{
    evaluate_expression, Actuator, RunConfig, RunSession, RuntimeError, ScopeChain,
    SessionError, TraceTable, Value,
};
use miette::Diagnostic;
use rustyline::{DefaultEditor, error::ReadlineError};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur in the REPL
#[derive(Debug, Error, Diagnostic)]
pub enum ReplError {
    #[error("Parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("Edit error: {source}")]
    Edit {
        #[from]
        source: EditError,
    },

    #[error("Run error: {source}")]
    Session {
        #[from]
        source: SessionError,
    },

    #[error("Runtime error: {source}")]
    Runtime {
        #[from]
        source: RuntimeError,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Readline error: {source}")]
    Readline {
        #[from]
        source: ReadlineError,
    },

    #[error("REPL command error: {message}")]
    #[diagnostic(help("Type /help for available commands"))]
    Command { message: String },
}

impl ReplError {
    fn usage(usage: &str) -> Self {
        Self::Command {
            message: format!("usage: {usage}"),
        }
    }
}

/// REPL session holding the canvas and the run session it executes against
pub struct ReplSession {
    /// Interactive line editor with history
    editor: DefaultEditor,

    /// Units on the canvas
    program: Program,

    /// Scope, trace and turtle shared by every run
    session: RunSession,

    config: ReplConfig,

    stats: ReplStats,
}

/// REPL configuration options
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Prompt string for input
    pub prompt: String,

    /// Enable history persistence
    pub persist_history: bool,

    /// History file path
    pub history_file: Option<String>,

    /// Execute runs on a worker thread instead of the REPL thread
    pub worker: bool,

    /// Output width and depth limit handed to every run
    pub run: RunConfig,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "blockrun> ".to_string(),
            persist_history: true,
            history_file: Some(".blockrun_history".to_string()),
            worker: false,
            run: RunConfig::default(),
        }
    }
}

/// REPL session statistics
#[derive(Debug, Clone, Default)]
pub struct ReplStats {
    /// Blocks placed on the canvas
    pub blocks_created: usize,

    /// Runs executed
    pub runs_completed: usize,

    /// Number of errors encountered
    pub errors_encountered: usize,

    /// Total REPL commands executed
    pub commands_executed: usize,
}

/// Result of evaluating a line in the REPL
#[derive(Debug)]
pub enum ReplResult {
    /// Executed a REPL command
    Command { message: String },

    /// Wrapped output of a run
    Run { lines: Vec<String> },

    /// Empty line or comment
    Empty,

    /// Exit request
    Exit,
}

impl ReplSession {
    /// Create a new REPL session with custom configuration
    pub fn with_config(config: ReplConfig) -> Result<Self, ReplError> {
        let mut editor = DefaultEditor::new()?;

        if config.persist_history {
            if let Some(ref history_file) = config.history_file {
                let _ = editor.load_history(history_file); // missing on first use
            }
        }

        Ok(Self {
            editor,
            program: Program::new(),
            session: RunSession::new(config.run),
            config,
            stats: ReplStats::default(),
        })
    }

    /// Start the REPL main loop
    pub fn run(&mut self) -> Result<(), ReplError> {
        self.print_welcome();

        while let Some(line) = self.read_line()? {
            match self.evaluate_line(&line) {
                Ok(ReplResult::Exit) => break,
                Ok(result) => self.display_result(result),
                Err(error) => {
                    self.stats.errors_encountered += 1;
                    self.display_error(error);
                }
            }
        }

        self.print_goodbye();
        self.save_history()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, ReplError> {
        match self.editor.readline(&self.config.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(ReplError::Readline { source: err }),
        }
    }

    /// Evaluate one line of input
    ///
    /// Lines starting with `/` are commands. Any other text is a quick entry:
    /// it becomes a new block placed on a fresh row below the existing units.
    pub fn evaluate_line(&mut self, line: &str) -> Result<ReplResult, ReplError> {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with("//") {
            return Ok(ReplResult::Empty);
        }

        if trimmed.starts_with('/') {
            self.stats.commands_executed += 1;
            return self.execute_command(trimmed);
        }

        let block = parse_entry(trimmed, EntryMode::Value)?;
        let placement = self.next_free_row();
        Ok(self.place_block(block, placement))
    }

    fn execute_command(&mut self, command: &str) -> Result<ReplResult, ReplError> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let args = &parts[1..];

        match parts[0] {
            "/help" | "/h" => Ok(ReplResult::Command {
                message: self.help_message(),
            }),

            "/new" => {
                let [x, y, entry] = args else {
                    return Err(ReplError::usage("/new X Y ENTRY"));
                };
                let block = parse_entry(entry, EntryMode::Value)?;
                Ok(self.place_block(block, parse_placement(x, y)?))
            }

            "/assign" => {
                let [x, y, name] = args else {
                    return Err(ReplError::usage("/assign X Y NAME"));
                };
                let block = parse_entry(name, EntryMode::Assignment)?;
                Ok(self.place_block(block, parse_placement(x, y)?))
            }

            "/palette" => {
                let [x, y, item] = args else {
                    return Err(ReplError::usage("/palette X Y ITEM"));
                };
                let block = parse_palette_item(item)?;
                Ok(self.place_block(block, parse_placement(x, y)?))
            }

            "/drop" => {
                let [unit, target, path] = args else {
                    return Err(ReplError::usage("/drop UNIT TARGET PATH"));
                };
                let unit = parse_unit(unit)?;
                let target = parse_unit(target)?;
                let path = parse_slot_path(path)?;

                let displaced = self.program.graft(unit, target, &path)?;
                let mut message = format!("Dropped {unit} into {target} at {path}");
                if let Some(displaced) = displaced {
                    message.push_str(&format!("; displaced block is now {displaced}"));
                }
                Ok(ReplResult::Command { message })
            }

            "/detach" => {
                let [target, path, x, y] = args else {
                    return Err(ReplError::usage("/detach TARGET PATH X Y"));
                };
                let target = parse_unit(target)?;
                let path = parse_slot_path(path)?;
                let placement = parse_placement(x, y)?;

                let id = self.program.detach(target, &path, placement)?;
                Ok(ReplResult::Command {
                    message: format!("Detached {path} from {target} as {id}"),
                })
            }

            "/place" => {
                let [unit, x, y] = args else {
                    return Err(ReplError::usage("/place UNIT X Y"));
                };
                let unit = parse_unit(unit)?;
                let placement = parse_placement(x, y)?;
                self.program.place(unit, placement)?;
                Ok(ReplResult::Command {
                    message: format!("Moved {unit} to ({}, {})", placement.x, placement.y),
                })
            }

            "/delete" => {
                let [unit] = args else {
                    return Err(ReplError::usage("/delete UNIT"));
                };
                let removed = self.program.remove(parse_unit(unit)?)?;
                Ok(ReplResult::Command {
                    message: format!("Deleted {}: {}", removed.id(), removed.block),
                })
            }

            "/list" => Ok(ReplResult::Command {
                message: self.format_program(),
            }),

            "/run" => self.run_program(),

            "/trace" => Ok(ReplResult::Command {
                message: format_trace(&self.session.snapshot().trace),
            }),

            "/clear-trace" => {
                self.session.clear_trace()?;
                Ok(ReplResult::Command {
                    message: "Trace cleared".to_string(),
                })
            }

            "/turtle" => Ok(ReplResult::Command {
                message: self.format_turtle(),
            }),

            "/vars" | "/variables" => Ok(ReplResult::Command {
                message: self.format_variables(),
            }),

            "/eval" => {
                let [unit] = args else {
                    return Err(ReplError::usage("/eval UNIT"));
                };
                let value = self.evaluate_unit(parse_unit(unit)?)?;
                Ok(ReplResult::Command {
                    message: value.to_string(),
                })
            }

            "/stats" => Ok(ReplResult::Command {
                message: self.format_stats(),
            }),

            "/config" => Ok(ReplResult::Command {
                message: self.format_config(),
            }),

            "/quit" | "/q" | "/exit" => Ok(ReplResult::Exit),

            unknown => Err(ReplError::Command {
                message: format!("Unknown command: {unknown}. Type /help for available commands."),
            }),
        }
    }

    fn place_block(&mut self, block: Block, placement: Placement) -> ReplResult {
        let description = block.to_string();
        let id = self.program.add(block, placement);
        self.stats.blocks_created += 1;
        ReplResult::Command {
            message: format!(
                "Created {id} at ({}, {}): {description}",
                placement.x, placement.y
            ),
        }
    }

    /// First row below every unit on the canvas
    fn next_free_row(&self) -> Placement {
        let y = self
            .program
            .units()
            .iter()
            .map(|unit| unit.placement.y.saturating_add(1))
            .max()
            .unwrap_or(0);
        Placement::new(0, y)
    }

    fn run_program(&mut self) -> Result<ReplResult, ReplError> {
        let timestamp = chrono::Local::now()
            .format("Run time: %d/%m/%Y %H:%M:%S")
            .to_string();
        debug!(
            units = self.program.len(),
            worker = self.config.worker,
            "running canvas"
        );

        let report = if self.config.worker {
            let handle = self
                .session
                .spawn_run(self.program.units().to_vec(), timestamp)?;
            handle.join()?
        } else {
            self.session.run_program(&self.program, timestamp)?
        };

        self.stats.runs_completed += 1;
        Ok(ReplResult::Run {
            lines: report.display_lines(),
        })
    }

    /// Evaluate an expression unit against the globals the last run left behind
    fn evaluate_unit(&self, id: UnitId) -> Result<Value, ReplError> {
        let unit = self
            .program
            .get(id)
            .ok_or(EditError::UnknownUnit { id })?;
        if !unit.block.is_expression() {
            return Err(ReplError::Command {
                message: format!("{id} is a {} block, not an expression", unit.block.kind_name()),
            });
        }

        let mut scope = ScopeChain::new();
        for (name, value) in self.session.snapshot().bindings {
            scope.write(&name, value);
        }
        Ok(evaluate_expression(&unit.block, &scope)?)
    }

    fn display_result(&self, result: ReplResult) {
        match result {
            ReplResult::Command { message } => println!("{message}"),
            ReplResult::Run { lines } => {
                for line in lines {
                    println!("{line}");
                }
            }
            ReplResult::Empty | ReplResult::Exit => {}
        }
    }

    /// Display an error as a miette report
    fn display_error(&self, error: ReplError) {
        let report = match error {
            ReplError::Parse { source } => miette::Report::new(source),
            ReplError::Edit { source } => miette::Report::new(source),
            ReplError::Session { source } => miette::Report::new(source),
            ReplError::Runtime { source } => miette::Report::new(source),
            error => miette::Report::new(error),
        };
        eprintln!("{report:?}");
    }

    fn print_welcome(&self) {
        println!("▦ Blockrun v{} ▦", env!("CARGO_PKG_VERSION"));
        println!("Type /help for commands, /quit to exit");
        println!();
    }

    fn print_goodbye(&self) {
        println!("Goodbye!");
    }

    fn save_history(&mut self) -> Result<(), ReplError> {
        if self.config.persist_history {
            if let Some(ref history_file) = self.config.history_file {
                self.editor.save_history(history_file)?;
            }
        }
        Ok(())
    }

    fn help_message(&self) -> String {
        r#"Blockrun REPL Commands:
  /help, /h                  Show this help message
  /new X Y ENTRY             Place a block typed as `if`, `while`, a number or a variable
  /assign X Y NAME           Place an assignment to NAME with an empty expression slot
  /palette X Y ITEM          Place a palette block: + - × ÷ ^ > < = moveTo moveForward rotate
  /drop UNIT TARGET PATH     Drop unit UNIT into the slot at PATH inside TARGET
  /detach TARGET PATH X Y    Lift the block at PATH out of TARGET onto the canvas
  /place UNIT X Y            Move a unit on the canvas
  /delete UNIT               Remove a unit from the canvas
  /list                      List units in run order
  /run                       Run every unit, top to bottom then left to right
  /trace                     Show the assignment trace
  /clear-trace               Discard the assignment trace
  /turtle                    Show the turtle position, heading and trail
  /vars, /variables          Show the globals of the last run
  /eval UNIT                 Evaluate an expression unit against the last run's globals
  /stats                     Show session statistics
  /config                    Show current configuration
  /quit, /q, /exit           Exit the REPL

Slot paths:
  left, right                Operator operands
  expr                       Assignment expression
  cond                       If or while condition
  then.N, else.N, body.N     Statement N of a branch or loop body
  start_x start_y dest_x dest_y  moveTo arguments
  distance, angle            moveForward and rotate arguments

Any other text is placed as a new block on the next free row.
Use Ctrl+C to clear the line, Ctrl+D to exit."#
            .to_string()
    }

    fn format_program(&self) -> String {
        if self.program.is_empty() {
            return "Canvas is empty".to_string();
        }

        let mut lines = vec!["Units in run order:".to_string()];
        for (rank, unit) in self.program.run_order().into_iter().enumerate() {
            lines.push(format!(
                "  Block {} {} ({}, {}): {}",
                rank + 1,
                unit.id(),
                unit.placement.x,
                unit.placement.y,
                unit.block
            ));
        }
        lines.join("\n")
    }

    fn format_variables(&self) -> String {
        let bindings = self.session.snapshot().bindings;
        if bindings.is_empty() {
            return "No variables defined".to_string();
        }

        let mut lines = vec!["Variables:".to_string()];
        for (name, value) in bindings {
            lines.push(format!("  {name}: {} = {value}", value.type_name()));
        }
        lines.join("\n")
    }

    fn format_turtle(&self) -> String {
        let turtle = self.session.snapshot().turtle;
        let mut lines = vec![
            format!("Position: {}", turtle.position()),
            format!("Heading: {:.1}°", turtle.heading().to_degrees()),
        ];
        if turtle.segments().is_empty() {
            lines.push("Trail: none".to_string());
        } else {
            lines.push("Trail:".to_string());
            for segment in turtle.segments() {
                lines.push(format!("  {} -> {}", segment.start, segment.end));
            }
        }
        lines.join("\n")
    }

    fn format_stats(&self) -> String {
        format!(
            r#"Session Statistics:
  Blocks created: {}
  Runs completed: {}
  Errors encountered: {}
  Commands executed: {}"#,
            self.stats.blocks_created,
            self.stats.runs_completed,
            self.stats.errors_encountered,
            self.stats.commands_executed
        )
    }

    fn format_config(&self) -> String {
        format!(
            r#"REPL Configuration:
  Line width: {}
  Max depth: {}
  Worker thread: {}
  Prompt: "{}"
  Persist history: {}
  History file: {}"#,
            self.session.config().line_length,
            self.session.config().max_depth,
            self.config.worker,
            self.config.prompt,
            self.config.persist_history,
            self.config.history_file.as_deref().unwrap_or("<none>")
        )
    }
}

/// Render the trace as aligned columns; absent cells are left blank
fn format_trace(trace: &TraceTable) -> String {
    let names: Vec<&str> = trace.column_names().collect();
    if names.is_empty() {
        return "Trace is empty".to_string();
    }

    let rows: Vec<Vec<String>> = trace
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map(|value| value.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(column, name)| {
            rows.iter()
                .map(|row| row[column].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(names.clone())];
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Unit ids are written as `3` or `#3`
fn parse_unit(text: &str) -> Result<UnitId, ReplError> {
    text.strip_prefix('#')
        .unwrap_or(text)
        .parse()
        .map(UnitId::new)
        .map_err(|_| ReplError::Command {
            message: format!("`{text}` is not a block id"),
        })
}

fn parse_placement(x: &str, y: &str) -> Result<Placement, ReplError> {
    let coordinate = |text: &str| {
        text.parse::<i32>().map_err(|_| ReplError::Command {
            message: format!("`{text}` is not a canvas coordinate"),
        })
    };
    Ok(Placement::new(coordinate(x)?, coordinate(y)?))
}
