use anyhow::{Context, Result};
use clap::Parser;
use data_runtime::configs::{server, telemetry};
use data_runtime::{scenario, specdb::SpecDb};
use net_core::transport::LocalLoopbackTransport;
use server_core::{ScriptRegistry, SpellState, scenario as run};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Run a scenario through the authoritative tick loop", long_about = None)]
struct Cli {
    /// Scenario JSON (see data/scenarios)
    scenario: PathBuf,
    /// Override the scenario's tick count
    #[arg(long)]
    ticks: Option<u32>,
    /// Override the configured step length
    #[arg(long)]
    tick_ms: Option<u32>,
    /// Replicate through the in-process loopback and count what arrives
    #[arg(long)]
    loopback: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tcfg = telemetry::load_default()?;
    let _guard = server_core::telemetry::init_telemetry(&tcfg)?;

    let mut cfg = server::load_default()?;
    if let Some(ms) = cli.tick_ms {
        cfg.tick_ms = ms.max(1);
    }
    let scn = scenario::load_json(&cli.scenario)?;
    let content = Arc::new(SpecDb::load_default().context("load spell content")?);
    let mut state = run::build(&scn, cfg.clone(), content, ScriptRegistry::with_builtins())?;

    let client = if cli.loopback {
        let (transport, client) = LocalLoopbackTransport::new(cfg.transport_capacity);
        state.attach_transport(Box::new(transport));
        Some(client)
    } else {
        None
    };

    let ticks = cli.ticks.unwrap_or(scn.ticks);
    let accepted = run::run(&mut state, &scn, ticks, cfg.tick_ms as f32)?;

    println!("scenario '{}': {} ticks, {:.2}s simulated", scn.name, state.tick(), state.time_s());
    println!("commands accepted: {}/{}", accepted, scn.commands.len());
    for u in state.world.units.values() {
        println!("  unit {:>3} {:?} hp {}/{} at ({:.0}, {:.0})", u.id.0, u.kind, u.hp.hp, u.hp.max, u.pos.x, u.pos.y);
    }
    for s in state.spells() {
        let info = s.info();
        let cd = match s.state() {
            SpellState::Ready => String::from("ready"),
            other => format!("{} {:.2}s", other.name(), s.current_cooldown()),
        };
        println!("  {:?} {} [{}] lvl {} -> {}", info.owner, info.name, s.slot_label(), s.level(), cd);
    }

    let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
    match &client {
        Some(c) => {
            for (_, msg) in c.drain_msgs()? {
                *kinds.entry(msg.kind()).or_default() += 1;
            }
        }
        None => {
            for out in state.drain_outbound() {
                *kinds.entry(out.msg.kind()).or_default() += 1;
            }
        }
    }
    println!("notifications:");
    for (k, n) in kinds {
        println!("  {k:<20} {n}");
    }
    Ok(())
}
