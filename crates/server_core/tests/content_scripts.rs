use data_runtime::configs::server::ServerCfg;
use data_runtime::specdb::SpecDb;
use glam::Vec2;
use net_core::msg::ServerMsg;
use net_core::transport::LocalLoopbackTransport;
use server_core::{ScriptRegistry, ServerState, SpellState, Team, Unit, UnitId, UnitKind};
use std::path::Path;
use std::sync::Arc;

const HERO: UnitId = UnitId(1);
const MINION: UnitId = UnitId(2);
const TICK_MS: f32 = 33.0;

fn arena() -> ServerState {
    let content = Arc::new(SpecDb::load_default().unwrap());
    let mut s = ServerState::new(ServerCfg::default(), content, ScriptRegistry::with_builtins());
    s.spawn_unit(Unit::new(HERO, UnitKind::Champion, Team::Blue, Vec2::ZERO, 100));
    s.spawn_unit(Unit::new(MINION, UnitKind::Minion, Team::Purple, Vec2::new(400.0, 0.0), 300));
    for (slot, name) in ["Bolt", "Barrier", "Blink", "Drain"].iter().enumerate() {
        s.add_spell(HERO, slot as u8, name).unwrap();
    }
    s
}

fn run(s: &mut ServerState, ticks: usize) {
    for _ in 0..ticks {
        s.step_authoritative(TICK_MS);
    }
}

#[test]
fn bolt_travels_and_damages_first_hostile() {
    let mut s = arena();
    // A friendly unit in the path is ignored.
    s.spawn_unit(Unit::new(UnitId(3), UnitKind::Minion, Team::Blue, Vec2::new(200.0, 0.0), 100));
    s.cast(HERO, 0, Vec2::new(400.0, 0.0), None).unwrap();
    run(&mut s, 30);

    assert_eq!(s.world.unit(MINION).unwrap().hp.hp, 240);
    assert_eq!(s.world.unit(UnitId(3)).unwrap().hp.hp, 100);
    assert!(s.world.projectiles.is_empty());
    let kinds: Vec<_> = s.drain_outbound().iter().map(|o| o.msg.kind()).collect();
    for k in ["projectile_spawn", "damage", "particle_spawn", "projectile_destroy", "set_cooldown"] {
        assert!(kinds.contains(&k), "missing {k} in {kinds:?}");
    }
}

#[test]
fn drain_channels_a_persistent_tether() {
    let mut s = arena();
    s.world.unit_mut(HERO).unwrap().hp.hp = 50;
    s.cast(HERO, 3, Vec2::new(400.0, 0.0), Some(MINION)).unwrap();
    run(&mut s, 10);
    assert!(matches!(s.spell(HERO, 3).unwrap().state(), SpellState::Channeling { .. }));
    assert_eq!(s.world.unit(MINION).unwrap().hp.hp, 260);
    assert_eq!(s.world.unit(HERO).unwrap().hp.hp, 70);
    assert!(s.world.unit(MINION).unwrap().buffs.iter().any(|b| b.name == "Drained"));
    assert_eq!(s.world.lasers.len(), 1);

    // One hit per unit for the whole channel; the tether ends with it.
    run(&mut s, 120);
    assert_eq!(s.world.unit(MINION).unwrap().hp.hp, 260);
    assert!(s.world.lasers.is_empty());
    assert!(matches!(s.spell(HERO, 3).unwrap().state(), SpellState::Cooldown { .. }));
    assert!(!s.world.unit(HERO).unwrap().is_casting);
}

#[test]
fn drain_rejects_targets_beyond_range() {
    let mut s = arena();
    s.world.unit_mut(MINION).unwrap().pos = Vec2::new(800.0, 0.0);
    assert!(s.cast(HERO, 3, Vec2::new(800.0, 0.0), Some(MINION)).is_err());
    assert_eq!(s.spell(HERO, 3).unwrap().state(), SpellState::Ready);
}

#[test]
fn blink_teleports_within_range() {
    let mut s = arena();
    s.drain_outbound();
    s.cast(HERO, 2, Vec2::new(1000.0, 0.0), None).unwrap();
    let pos = s.world.unit(HERO).unwrap().pos;
    assert!((pos.x - 475.0).abs() < 1e-3 && pos.y.abs() < 1e-3, "{pos:?}");
    assert!(
        s.drain_outbound()
            .iter()
            .any(|o| matches!(o.msg, ServerMsg::Teleport { unit: 1, .. }))
    );
}

#[test]
fn barrier_buff_and_visual_expire_together() {
    let mut s = arena();
    s.cast(HERO, 1, Vec2::ZERO, None).unwrap();
    assert!(s.world.unit(HERO).unwrap().buffs.iter().any(|b| b.name == "Barrier"));
    assert_eq!(s.world.particles.len(), 1);
    run(&mut s, 80);
    assert!(s.world.unit(HERO).unwrap().buffs.is_empty());
    assert!(s.world.particles.is_empty());
}

#[test]
fn hit_and_blink_visuals_expire_on_their_own() {
    let mut s = arena();
    for _ in 0..3 {
        s.cast(HERO, 0, Vec2::new(400.0, 0.0), None).unwrap();
        run(&mut s, 20);
        s.set_cooldown(HERO, 0, 0.0).unwrap();
    }
    assert_eq!(s.world.unit(MINION).unwrap().hp.hp, 30);
    s.cast(HERO, 2, Vec2::new(-300.0, 0.0), None).unwrap();
    assert!(!s.world.particles.is_empty());

    run(&mut s, 60);
    assert!(s.world.particles.is_empty(), "{:?}", s.world.particles);
    let destroyed = s
        .drain_outbound()
        .iter()
        .filter(|o| matches!(o.msg, ServerMsg::ParticleDestroy { .. }))
        .count();
    assert_eq!(destroyed, 4);
}

#[test]
fn loopback_client_sees_the_same_stream() {
    let mut s = arena();
    let (transport, client) = LocalLoopbackTransport::new(1024);
    s.attach_transport(Box::new(transport));
    s.cast(HERO, 0, Vec2::new(400.0, 0.0), None).unwrap();
    run(&mut s, 30);
    assert!(s.pending_outbound().is_empty());
    let msgs = client.drain_msgs().unwrap();
    assert!(msgs.iter().any(|(_, m)| matches!(m, ServerMsg::Damage { target: 2, hp_after: 240, .. })));
    assert!(msgs.iter().any(|(_, m)| matches!(m, ServerMsg::SetCooldown { owner: 1, slot: 0, .. })));
}

#[test]
fn full_transport_drops_messages_but_keeps_state() {
    let mut s = arena();
    let (transport, client) = LocalLoopbackTransport::new(1);
    s.attach_transport(Box::new(transport));
    s.cast(HERO, 0, Vec2::new(400.0, 0.0), None).unwrap();
    run(&mut s, 30);
    assert_eq!(s.world.unit(MINION).unwrap().hp.hp, 240);
    assert_eq!(client.depth(), 1);
}

#[test]
fn duel_scenario_runs_to_completion() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/scenarios/duel.json");
    let scn = data_runtime::scenario::load_json(&path).unwrap();
    let content = Arc::new(SpecDb::load_default().unwrap());
    let mut s = server_core::scenario::build(&scn, ServerCfg::default(), content, ScriptRegistry::with_builtins()).unwrap();
    let accepted = server_core::scenario::run(&mut s, &scn, scn.ticks, TICK_MS).unwrap();
    assert_eq!(accepted, scn.commands.len());
    // Level-1 Bolt (90) plus one Drain hit (40).
    assert_eq!(s.world.unit(MINION).unwrap().hp.hp, 170);
    assert_eq!(s.tick(), u64::from(scn.ticks));
}
