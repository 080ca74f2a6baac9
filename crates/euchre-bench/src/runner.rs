use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use euchre_core::game::action::Action;
use euchre_core::game::engine::EuchreGame;
use euchre_core::game::serialization::HandRecord;
use euchre_core::model::player::{PlayerPosition, Team};
use euchre_core::{AppInfo, EuchreError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentConfig, AgentKind, BenchConfig, ResolvedOutputs};

/// Plays seeded hands between four configured seat policies.
pub struct BenchRunner {
    config: BenchConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub hands_played: usize,
    pub rows_written: usize,
    pub team_wins: [usize; 2],
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

/// One JSONL row per hand.
#[derive(Debug, Clone, Serialize)]
struct HandLogRow {
    run_id: String,
    hand_id: String,
    hand_index: usize,
    deal_seed: u64,
    dealer: PlayerPosition,
    maker: Option<PlayerPosition>,
    trump: Option<String>,
    tricks: [u8; 4],
    winners: Team,
    payoffs: [i32; 4],
    record: HandRecord,
}

impl BenchRunner {
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.agents.len() != 4 {
            return Err(RunnerError::SeatCount {
                found: config.agents.len(),
            });
        }
        Ok(Self { config, outputs })
    }

    /// Plays every configured hand, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        let mut team_wins = [0usize; 2];
        let mut rows_written = 0usize;

        event!(
            target: "euchre_bench::run",
            Level::INFO,
            run_id = %self.config.run_id,
            engine = AppInfo::name(),
            version = AppInfo::version(),
            hands = self.config.deals.hands as u64,
        );

        for hand_index in 0..self.config.deals.hands {
            let deal_seed = rng.next_u64();
            let row = self.play_hand(hand_index, deal_seed)?;
            match row.winners {
                Team::NorthSouth => team_wins[0] += 1,
                Team::EastWest => team_wins[1] += 1,
            }
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            rows_written += 1;
        }
        writer.flush()?;

        write_summary(
            &self.outputs.summary_md,
            &self.config,
            rows_written,
            team_wins,
        )?;

        Ok(RunSummary {
            hands_played: self.config.deals.hands,
            rows_written,
            team_wins,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn play_hand(&self, hand_index: usize, deal_seed: u64) -> Result<HandLogRow, RunnerError> {
        let mut game = EuchreGame::with_seed(deal_seed);
        let mut policy_rng = StdRng::seed_from_u64(deal_seed.rotate_left(17));
        let (_, mut seat) = game.init_game()?;

        while !game.is_over() {
            let legal = game.get_legal_actions();
            let agent = &self.config.agents[seat.index()];
            let action = choose_action(agent, &legal, &mut policy_rng)
                .ok_or(RunnerError::NoLegalAction { seat })?;
            event!(
                target: "euchre_bench::action",
                Level::DEBUG,
                hand_index = hand_index as u64,
                seat = %seat,
                agent = %agent.name,
                %action,
            );
            let (_, next) = game.step_action(action)?;
            seat = next;
        }

        let hand = game.hand_state().ok_or(EuchreError::NotStarted)?;
        let result = hand.result().ok_or(RunnerError::Unscored)?;
        let record = HandRecord::capture(&game).ok_or(EuchreError::NotStarted)?;
        let payoffs = game.get_payoffs().ok_or(RunnerError::Unscored)?;

        event!(
            target: "euchre_bench::hand",
            Level::INFO,
            run_id = %self.config.run_id,
            hand_index = hand_index as u64,
            winners = ?result.winners,
            tricks = ?hand.tricks_won(),
        );

        Ok(HandLogRow {
            run_id: self.config.run_id.clone(),
            hand_id: format!("H{hand_index:05}"),
            hand_index,
            deal_seed,
            dealer: hand.dealer(),
            maker: hand.maker(),
            trump: hand.trump().map(|suit| suit.to_string()),
            tricks: *hand.tricks_won(),
            winners: result.winners,
            payoffs,
            record,
        })
    }
}

fn choose_action(agent: &AgentConfig, legal: &[Action], rng: &mut StdRng) -> Option<Action> {
    match agent.kind {
        AgentKind::Random => legal.choose(rng).copied(),
        AgentKind::FirstLegal => legal.first().copied(),
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_summary(
    path: &Path,
    config: &BenchConfig,
    hands: usize,
    team_wins: [usize; 2],
) -> Result<(), RunnerError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# Self-play summary: {}", config.run_id)?;
    writeln!(out)?;
    writeln!(out, "Hands played: {hands}")?;
    writeln!(out)?;
    writeln!(out, "| Team | Seats | Agents | Hands won |")?;
    writeln!(out, "|---|---|---|---|")?;
    for (slot, team) in [Team::NorthSouth, Team::EastWest].into_iter().enumerate() {
        let [a, b] = team.seats();
        writeln!(
            out,
            "| {team:?} | {a}, {b} | {}, {} | {} |",
            config.agents[a.index()].name,
            config.agents[b.index()].name,
            team_wins[slot]
        )?;
    }
    out.flush()?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("configuration requires exactly 4 agents but found {found}")]
    SeatCount { found: usize },
    #[error("engine rejected a step: {0}")]
    Engine(#[from] EuchreError),
    #[error("{seat} had no legal action")]
    NoLegalAction { seat: PlayerPosition },
    #[error("hand finished without a result")]
    Unscored,
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
