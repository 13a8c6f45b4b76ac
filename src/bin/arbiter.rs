// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

use arbiter::{
    core::{Color, PieceKind},
    notation::{self, Notation},
    snapshot::GameSnapshot,
    Game, MoveError, MoveRequest,
};

const SAVE_EXTENSION: &str = "json";

const HELP: &str = "\
Moves are a piece letter followed by the destination square: pe4, nf3, qh5.
  p n b r q k          pawn, knight, bishop, rook, queen, king
  ngf3, n1f3, ng1f3    say which piece moves when more than one can
  pexd5                captures may be marked with an x
  pe8=q, pe8q          promote a pawn reaching the last rank
  o-o, o-o-o           castle kingside or queenside
Other commands:
  draw                 offer a draw, then make your move
  resign               concede the game
  save [NAME]          save the game, to the most recent save if no name is given
  show saves           list saved games, newest first
  help                 show this message
  exit, quit           leave the game";

/// Two people playing chess at one terminal.
#[derive(Debug, StructOpt)]
struct Options {
    /// Start from this position, in FEN, instead of the usual starting position.
    #[structopt(long)]
    fen: Option<String>,

    /// Resume a saved game.
    #[structopt(long, conflicts_with = "fen")]
    load: Option<String>,

    /// Directory that games are saved to and loaded from.
    #[structopt(long, default_value = "saves", parse(from_os_str))]
    save_dir: PathBuf,

    /// Name of the player with the white pieces.
    #[structopt(long, default_value = "White")]
    white: String,

    /// Name of the player with the black pieces.
    #[structopt(long, default_value = "Black")]
    black: String,
}

/// What gets written to disk when a game is saved.
#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    white: String,
    black: String,
    game: GameSnapshot,
}

struct Session {
    game: Game,
    names: [String; 2],
    save_dir: PathBuf,
}

enum Flow {
    Continue,
    Exit,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::WARN)
        .with_env_filter(EnvFilter::from_env("ARBITER_LOG"))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let ops = Options::from_args();
    let mut session = match (&ops.load, &ops.fen) {
        (Some(name), _) => {
            let save = load(&ops.save_dir, name)?;
            Session {
                game: Game::from_snapshot(&save.game)?,
                names: [save.white, save.black],
                save_dir: ops.save_dir.clone(),
            }
        }
        (None, Some(fen)) => Session {
            game: Game::from_fen(fen)?,
            names: [ops.white.clone(), ops.black.clone()],
            save_dir: ops.save_dir.clone(),
        },
        (None, None) => Session {
            game: Game::new(),
            names: [ops.white.clone(), ops.black.clone()],
            save_dir: ops.save_dir.clone(),
        },
    };

    let stdin = io::stdin();
    let mut input = stdin.lock().lines();
    println!("{}", session.game);
    loop {
        if let Some(outcome) = session.game.outcome() {
            println!("{}", session.describe(outcome.winner(), &outcome.to_string()));
            break;
        }

        let active = session.game.active();
        if session.game.pending_draw_offer() {
            println!("{} has offered a draw.", session.name(active.toggle()));
            let question = format!("{}, agree to a draw? [y/n] ", session.name(active));
            let accept = loop {
                match prompt(&mut input, &question)?.as_deref() {
                    Some("y") | Some("yes") => break true,
                    Some("n") | Some("no") => break false,
                    Some(_) => continue,
                    None => return Ok(()),
                }
            };

            if session.game.respond_to_draw(accept)?.is_none() {
                println!("Draw rejected.");
            }

            continue;
        }

        let line = match prompt(&mut input, &format!("{}: ", session.name(active)))? {
            Some(line) => line,
            None => break,
        };

        if let Flow::Exit = session.handle(&line, &mut input)? {
            break;
        }
    }

    Ok(())
}

impl Session {
    fn name(&self, color: Color) -> &str {
        &self.names[color as usize]
    }

    fn describe(&self, winner: Option<Color>, outcome: &str) -> String {
        match winner {
            Some(color) => format!("Game over: {}. {} wins!", outcome, self.name(color)),
            None => format!("Game over: {}.", outcome),
        }
    }

    /// Carries out one line of input from the player whose turn it is.
    fn handle<I>(&mut self, line: &str, input: &mut I) -> anyhow::Result<Flow>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let words: Vec<_> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["help"] => println!("{}", HELP),
            ["exit"] | ["quit"] => return Ok(Flow::Exit),
            ["save"] => self.save(None)?,
            ["save", name] => self.save(Some(*name))?,
            ["show", "saves"] => list_saves(&self.save_dir)?,
            ["resign"] => {
                let resigned = self.game.active();
                self.game.resign()?;
                println!("{} has resigned.", self.name(resigned));
            }
            ["draw"] => {
                self.game.offer_draw()?;
                println!("You have offered a draw. Make your move.");
            }
            [word] => self.play(word, input)?,
            _ => println!("Invalid input. Enter help for commands."),
        }

        Ok(Flow::Continue)
    }

    fn play<I>(&mut self, word: &str, input: &mut I) -> anyhow::Result<()>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let notation = match notation::parse(word) {
            Ok(notation) => notation,
            Err(err) => {
                println!("{}. Enter help for commands.", err);
                return Ok(());
            }
        };

        let result = match notation {
            Notation::CastleKingside => self.game.castle_kingside(),
            Notation::CastleQueenside => self.game.castle_queenside(),
            Notation::Move(request) => self.apply(request, input)?,
        };

        match result {
            Ok(()) => {
                println!("{}", self.game);
                let active = self.game.active();
                if !self.game.is_over() && self.game.is_in_check(active) {
                    println!("{} is in check!", self.name(active));
                }
            }
            Err(err) => println!("{}", err),
        }

        Ok(())
    }

    /// Applies a move, asking the player what to promote to if the move needs it.
    fn apply<I>(
        &mut self,
        request: MoveRequest,
        input: &mut I,
    ) -> anyhow::Result<Result<(), MoveError>>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        match self.game.apply_move(&request) {
            Err(MoveError::PromotionRequired(_)) => {}
            result => return Ok(result.map(|_| ())),
        }

        let kind = loop {
            let answer = match prompt(input, "Promote to? [q/r/b/n] ")? {
                Some(answer) => answer,
                None => return Err(anyhow!("input ended while choosing a promotion")),
            };

            let mut chars = answer.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => match PieceKind::try_from(c) {
                    Ok(kind) if kind.is_promotion_target() => break kind,
                    _ => continue,
                },
                _ => continue,
            }
        };

        Ok(self.game.apply_move(&request.promote_to(kind)).map(|_| ()))
    }

    fn save(&self, name: Option<&str>) -> anyhow::Result<()> {
        fs::create_dir_all(&self.save_dir)
            .with_context(|| format!("creating {}", self.save_dir.display()))?;
        let name = match name {
            Some(name) => name.to_owned(),
            None => match saves_by_date(&self.save_dir)?.into_iter().next() {
                Some((name, _)) => name,
                None => {
                    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
                    format!("game{}", now.as_secs())
                }
            },
        };

        let path = save_path(&self.save_dir, &name);
        let is_new = !path.exists();
        let save = SaveFile {
            white: self.names[Color::White as usize].clone(),
            black: self.names[Color::Black as usize].clone(),
            game: self.game.snapshot(),
        };
        let file = fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &save)?;
        tracing::info!(path = %path.display(), "saved game");
        if is_new {
            println!("New save '{}' created!", name);
        } else {
            println!("'{}' saved!", name);
        }

        Ok(())
    }
}

/// Prints a prompt and reads one line of input, lowercased and trimmed. Returns `None` once input runs out.
fn prompt<I>(input: &mut I, text: &str) -> anyhow::Result<Option<String>>
where
    I: Iterator<Item = io::Result<String>>,
{
    print!("{}", text);
    io::stdout().flush()?;
    match input.next() {
        Some(line) => Ok(Some(line?.trim().to_lowercase())),
        None => Ok(None),
    }
}

fn save_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name).with_extension(SAVE_EXTENSION)
}

fn load(dir: &Path, name: &str) -> anyhow::Result<SaveFile> {
    let path = save_path(dir, name);
    let file = fs::File::open(&path)
        .with_context(|| format!("saved game '{}' does not exist", name))?;
    let save = serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(save)
}

/// Saved games in the directory, most recently modified first.
fn saves_by_date(dir: &Path) -> anyhow::Result<Vec<(String, SystemTime)>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut saves = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SAVE_EXTENSION) {
            continue;
        }

        let name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(name) => name.to_owned(),
            None => continue,
        };

        let modified = fs::metadata(&path)?.modified()?;
        saves.push((name, modified));
    }

    saves.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(saves)
}

fn list_saves(dir: &Path) -> anyhow::Result<()> {
    let saves = saves_by_date(dir)?;
    println!("*** Saved games ***");
    if saves.is_empty() {
        println!("No saves found.");
    }

    for (name, modified) in saves {
        let age = SystemTime::now()
            .duration_since(modified)
            .map(|d| d.as_secs() / 60)
            .unwrap_or(0);
        println!("{} ({} minutes ago)", name, age);
    }

    println!("*** End ***");
    Ok(())
}
