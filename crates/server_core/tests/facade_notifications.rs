use data_runtime::configs::server::ServerCfg;
use data_runtime::specdb::SpecDb;
use data_runtime::spell::SpellData;
use glam::Vec2;
use net_core::Channel;
use net_core::msg::ServerMsg;
use server_core::nav::GridNav;
use server_core::{DashParams, Effects, ScriptRegistry, ServerState, Team, Unit, UnitId, UnitKind};
use std::sync::Arc;

const A: UnitId = UnitId(1);
const B: UnitId = UnitId(2);

fn state() -> ServerState {
    let mut db = SpecDb::new();
    let mut bolt = SpellData::named("Shot");
    bolt.missile_speed = 1000.0;
    bolt.line_width = 20.0;
    db.insert(bolt).unwrap();
    let mut nav = GridNav::new(50.0);
    nav.block_rect(Vec2::new(1000.0, 1000.0), Vec2::new(1199.0, 1199.0));
    let mut s = ServerState::with_nav(ServerCfg::default(), Arc::new(db), ScriptRegistry::new(), Box::new(nav));
    s.spawn_unit(Unit::new(A, UnitKind::Champion, Team::Blue, Vec2::ZERO, 100));
    s.spawn_unit(Unit::new(B, UnitKind::Champion, Team::Purple, Vec2::new(300.0, 0.0), 100));
    s.add_spell(A, 0, "Shot").unwrap();
    s
}

/// Runs `f` and asserts it produced exactly one notification, returning it.
fn exactly_one<R>(s: &mut ServerState, f: impl FnOnce(&mut Effects<'_>) -> R) -> (R, ServerMsg) {
    s.drain_outbound();
    let r = s.with_effects(f);
    let mut out = s.drain_outbound();
    assert_eq!(out.len(), 1, "expected one notification, got {out:?}");
    (r, out.remove(0).msg)
}

#[test]
fn every_mutating_call_emits_exactly_one_notification() {
    let mut s = state();

    let (buff, msg) = exactly_one(&mut s, |fx| fx.add_buff("Slow", 0.0, 1, B, A).unwrap());
    assert!(matches!(msg, ServerMsg::AddBuff { target: 2, source: 1, .. }));
    assert_eq!(s.world.unit(B).unwrap().buffs.len(), 1);

    let (removed, msg) = exactly_one(&mut s, |fx| fx.remove_buff(B, buff));
    assert!(removed);
    assert!(matches!(msg, ServerMsg::RemoveBuff { target: 2, .. }));
    assert!(s.world.unit(B).unwrap().buffs.is_empty());

    let (p, msg) = exactly_one(&mut s, |fx| fx.add_particle(A, "Glow.troy", Vec2::ONE, 1.0, "", None));
    assert!(matches!(msg, ServerMsg::ParticleSpawn { net_id, .. } if net_id == p));
    assert!(s.world.particles.contains_key(&p));
    let (_, msg) = exactly_one(&mut s, |fx| fx.remove_particle(p));
    assert_eq!(msg, ServerMsg::ParticleDestroy { net_id: p });

    let (pt, msg) = exactly_one(&mut s, |fx| fx.add_particle_target(A, "Mark.troy", B, 2.0, "head", None).unwrap());
    assert!(matches!(msg, ServerMsg::ParticleSpawn { target_unit: Some(2), .. }));
    assert!(s.world.particles.contains_key(&pt));

    let info = s.spell(A, 0).unwrap().info().clone();
    let (net_id, msg) = exactly_one(&mut s, |fx| fx.add_projectile(&info, "ShotMissile", Vec2::new(0.0, 500.0), false).unwrap());
    assert!(matches!(msg, ServerMsg::ProjectileSpawn { net_id: n, speed, .. } if n == net_id && speed == 1000.0));
    assert_eq!(s.world.staged_len(), 1);

    let (_, msg) = exactly_one(&mut s, |fx| fx.add_projectile_target(&info, "ShotMissile", B, false).unwrap());
    assert!(matches!(msg, ServerMsg::ProjectileSpawn { target_unit: Some(2), .. }));

    let (_, msg) = exactly_one(&mut s, |fx| fx.face_direction(A, Vec2::new(0.0, -3.0), true, 0.0).unwrap());
    assert!(matches!(msg, ServerMsg::FaceDirection { unit: 1, .. }));
    assert_eq!(s.world.unit(A).unwrap().facing, Vec2::new(0.0, -1.0));

    let (_, msg) = exactly_one(&mut s, |fx| fx.spell_animation(A, "Spell1").unwrap());
    assert!(matches!(msg, ServerMsg::SpellAnimation { unit: 1, .. }));

    let (_, msg) = exactly_one(&mut s, |fx| fx.set_animations(A, vec!["RUN".into(), "Run_Haste".into()]).unwrap());
    assert!(matches!(msg, ServerMsg::SetAnimation { unit: 1, ref names } if names.len() == 2));
    assert_eq!(s.world.unit(A).unwrap().animation_overrides.len(), 2);

    let (_, msg) = exactly_one(&mut s, |fx| fx.set_visibility(A, false).unwrap());
    assert_eq!(msg, ServerMsg::Visibility { unit: 1, visible: false });
    assert!(!s.world.unit(A).unwrap().visible_to.contains(&Team::Purple));

    let (_, msg) = exactly_one(&mut s, |fx| fx.set_model(A, "Skin02").unwrap());
    assert!(matches!(msg, ServerMsg::SetModel { unit: 1, .. }));
    assert_eq!(s.world.unit(A).unwrap().model, "Skin02");

    let (hp, msg) = exactly_one(&mut s, |fx| fx.deal_damage(A, B, 30).unwrap());
    assert_eq!(hp, 70);
    assert_eq!(msg, ServerMsg::Damage { source: 1, target: 2, amount: 30, hp_after: 70 });

    let (_, msg) = exactly_one(&mut s, |fx| fx.dash_to_unit(A, B, DashParams::default()).unwrap());
    assert!(matches!(msg, ServerMsg::Dash { unit: 1, target_unit: Some(2), .. }));
    assert!(s.world.unit(A).unwrap().dash.is_some());

    let (_, msg) = exactly_one(&mut s, |fx| fx.dash_to_location(B, Vec2::new(300.0, 300.0), DashParams::default()).unwrap());
    assert!(matches!(msg, ServerMsg::Dash { unit: 2, target_unit: None, .. }));

    let (_, msg) = exactly_one(&mut s, |fx| fx.send_packet("DE AD be ef").unwrap());
    assert_eq!(msg, ServerMsg::Raw { bytes: vec![0xde, 0xad, 0xbe, 0xef] });

    let (_, msg) = exactly_one(&mut s, |fx| fx.print_chat("gg"));
    assert_eq!(msg, ServerMsg::DebugMessage { text: "gg".into() });
}

#[test]
fn teleport_resolves_to_walkable_ground() {
    let mut s = state();
    let (pos, msg) = exactly_one(&mut s, |fx| fx.teleport_to(A, Vec2::new(1100.0, 1100.0)).unwrap());
    assert!(s.with_effects(|fx| fx.is_walkable(pos)));
    assert_eq!(s.world.unit(A).unwrap().pos, pos);
    assert_eq!(msg, ServerMsg::Teleport { unit: 1, pos: [pos.x, pos.y] });
}

#[test]
fn server_only_hazards_are_not_replicated() {
    let mut s = state();
    let info = s.spell(A, 0).unwrap().info().clone();
    s.drain_outbound();
    s.with_effects(|fx| {
        fx.add_projectile(&info, "Hidden", Vec2::new(0.0, 500.0), true).unwrap();
        fx.add_laser(&info, Vec2::new(0.0, 500.0), true).unwrap();
    });
    assert_eq!(s.world.staged_len(), 2);
    assert!(s.pending_outbound().is_empty());
}

#[test]
fn removing_twice_is_silent() {
    let mut s = state();
    let p = s.with_effects(|fx| fx.add_particle(A, "Glow.troy", Vec2::ZERO, 1.0, "", None));
    assert!(s.with_effects(|fx| fx.remove_particle(p)));
    s.drain_outbound();
    assert!(!s.with_effects(|fx| fx.remove_particle(p)));
    assert!(s.pending_outbound().is_empty());
}

#[test]
fn hud_visual_remove_after_fires_one_removal() {
    let mut s = state();
    let id = s.with_effects(|fx| fx.add_buff_hud_visual("Icon", 0.0, 1, A, Some(2.0)).unwrap());
    let slot = s.world.unit(A).unwrap().buffs.iter().find(|b| b.id == id).unwrap().slot;
    s.drain_outbound();

    let removals = |s: &mut ServerState| {
        s.drain_outbound()
            .into_iter()
            .filter(|o| matches!(o.msg, ServerMsg::RemoveBuff { .. }))
            .map(|o| o.msg)
            .collect::<Vec<_>>()
    };
    for _ in 0..3 {
        s.step_authoritative(500.0);
        assert!(removals(&mut s).is_empty());
    }
    s.step_authoritative(500.0);
    assert_eq!(removals(&mut s), vec![ServerMsg::RemoveBuff { target: 1, slot, name: "Icon".into() }]);
    assert!(s.world.unit(A).unwrap().buffs.is_empty());
    for _ in 0..4 {
        s.step_authoritative(500.0);
    }
    assert!(removals(&mut s).is_empty());
}

#[test]
fn timed_buff_expires_and_restack_outlives_old_timer() {
    let mut s = state();
    s.with_effects(|fx| fx.add_buff("Haste", 1.0, 1, A, A).unwrap());
    s.step_authoritative(600.0);
    // Restack: the first expiry timer now targets a stale id.
    s.with_effects(|fx| fx.add_buff("Haste", 1.0, 1, A, A).unwrap());
    s.step_authoritative(600.0);
    let u = s.world.unit(A).unwrap();
    assert_eq!(u.buffs.len(), 1, "restacked buff must survive the stale timer");
    assert_eq!(u.buffs[0].stacks, 2);
    s.step_authoritative(600.0);
    assert!(s.world.unit(A).unwrap().buffs.is_empty());
}

#[test]
fn chat_is_kept_and_sent_on_chat_channel() {
    let mut s = state();
    s.drain_outbound();
    s.with_effects(|fx| fx.print_chat("hello"));
    assert_eq!(s.world.chat_log, vec!["hello".to_string()]);
    assert_eq!(s.pending_outbound().iter().next().unwrap().channel, Channel::Chat);
}
