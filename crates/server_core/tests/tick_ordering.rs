use data_runtime::configs::server::ServerCfg;
use data_runtime::specdb::SpecDb;
use data_runtime::spell::{SpellData, flags};
use glam::Vec2;
use net_core::msg::ServerMsg;
use server_core::objects::Projectile;
use server_core::{
    AbilityScript, Effects, ScriptRegistry, ServerState, SpellInfo, Team, Unit, UnitId, UnitKind,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

type Log = Rc<RefCell<Vec<String>>>;

/// Records every hook call and fires a fast missile on finish.
struct Probe {
    log: Log,
}

impl AbilityScript for Probe {
    fn on_activate(&mut self, _fx: &mut Effects<'_>, owner: UnitId) {
        self.log.borrow_mut().push(format!("activate {}", owner.0));
    }
    fn on_start_casting(&mut self, _fx: &mut Effects<'_>, _spell: &SpellInfo, _target: Option<UnitId>) {
        self.log.borrow_mut().push("start".into());
    }
    fn on_finish_casting(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, _target: Option<UnitId>) {
        self.log.borrow_mut().push("finish".into());
        fx.add_projectile(spell, "ProbeMissile", spell.target_pos, false).unwrap();
    }
    fn apply_effects(&mut self, _fx: &mut Effects<'_>, _spell: &SpellInfo, target: UnitId, p: Option<&Projectile>) {
        self.log.borrow_mut().push(format!("hit {} by {}", target.0, p.map_or("laser", |p| p.name.as_str())));
    }
}

fn setup() -> (ServerState, Log) {
    let mut probe = SpellData::named("Probe");
    probe.flags = flags::INSTANT_CAST;
    probe.missile_speed = 100_000.0;
    probe.line_width = 10.0;
    probe.cooldown_s = vec![1.0];
    let mut db = SpecDb::new();
    db.insert(probe).unwrap();

    let log: Log = Rc::default();
    let mut scripts = ScriptRegistry::new();
    let l = log.clone();
    scripts.register("Probe", move || Box::new(Probe { log: l.clone() }));

    let mut s = ServerState::new(ServerCfg::default(), Arc::new(db), scripts);
    s.spawn_unit(Unit::new(UnitId(1), UnitKind::Champion, Team::Blue, Vec2::ZERO, 100));
    s.spawn_unit(Unit::new(UnitId(2), UnitKind::Champion, Team::Purple, Vec2::new(300.0, 0.0), 100));
    (s, log)
}

#[test]
fn activate_runs_once_at_construction() {
    let (mut s, log) = setup();
    s.add_spell(UnitId(1), 0, "Probe").unwrap();
    assert_eq!(*log.borrow(), vec!["activate 1".to_string()]);
}

#[test]
fn unregistered_names_fall_back_to_noop() {
    let mut db = SpecDb::new();
    db.insert(SpellData::named("Plain")).unwrap();
    let mut s = ServerState::new(ServerCfg::default(), Arc::new(db), ScriptRegistry::new());
    s.spawn_unit(Unit::new(UnitId(1), UnitKind::Champion, Team::Blue, Vec2::ZERO, 100));
    s.add_spell(UnitId(1), 0, "Plain").unwrap();
    s.cast(UnitId(1), 0, Vec2::X, None).unwrap();
    s.step_authoritative(16.0);
}

#[test]
fn projectile_spawned_in_hook_is_simulated_from_next_tick() {
    let (mut s, log) = setup();
    s.add_spell(UnitId(1), 0, "Probe").unwrap();
    s.cast(UnitId(1), 0, Vec2::new(300.0, 0.0), None).unwrap();
    assert_eq!(*log.borrow(), vec!["activate 1", "start", "finish"]);
    assert!(s.world.projectiles.is_empty());
    assert_eq!(s.world.staged_len(), 1);

    s.step_authoritative(33.0);
    assert!(log.borrow().iter().any(|l| l == "hit 2 by ProbeMissile"));
    assert!(s.world.projectiles.is_empty());
    let kinds: Vec<_> = s.drain_outbound().iter().map(|o| o.msg.kind()).collect();
    let spawn = kinds.iter().position(|k| *k == "projectile_spawn").unwrap();
    let destroy = kinds.iter().position(|k| *k == "projectile_destroy").unwrap();
    assert!(spawn < destroy);
}

#[test]
fn timers_scheduled_by_timers_wait_a_tick() {
    let (mut s, _) = setup();
    s.with_effects(|fx| {
        fx.create_timer(0.0, |fx| {
            fx.print_chat("a");
            fx.create_timer(0.0, |fx| fx.print_chat("b"));
        });
    });
    s.step_authoritative(16.0);
    assert_eq!(s.world.chat_log, vec!["a"]);
    s.step_authoritative(16.0);
    assert_eq!(s.world.chat_log, vec!["a", "b"]);
}

#[test]
fn hooks_can_queue_cooldown_overrides() {
    struct Refund;
    impl AbilityScript for Refund {
        fn on_finish_casting(&mut self, fx: &mut Effects<'_>, spell: &SpellInfo, _t: Option<UnitId>) {
            fx.lower_cooldown(spell.owner, spell.slot, 100.0);
        }
    }
    let mut d = SpellData::named("Refund");
    d.cast_time_s = 0.1;
    d.cooldown_s = vec![10.0];
    let mut db = SpecDb::new();
    db.insert(d).unwrap();
    let mut scripts = ScriptRegistry::new();
    scripts.register("Refund", || Box::new(Refund));
    let mut s = ServerState::new(ServerCfg::default(), Arc::new(db), scripts);
    s.spawn_unit(Unit::new(UnitId(1), UnitKind::Champion, Team::Blue, Vec2::ZERO, 100));
    s.add_spell(UnitId(1), 0, "Refund").unwrap();
    s.cast(UnitId(1), 0, Vec2::X, None).unwrap();
    s.step_authoritative(100.0);
    // The override is applied after the spell pass, once the cooldown began.
    assert_eq!(s.spell(UnitId(1), 0).unwrap().state(), server_core::SpellState::Ready);
}

#[test]
fn spells_advance_in_table_order() {
    let mut q = SpellData::named("Q");
    q.cast_time_s = 0.25;
    q.cooldown_s = vec![3.0];
    let mut db = SpecDb::new();
    db.insert(q).unwrap();
    let mut s = ServerState::new(ServerCfg::default(), Arc::new(db), ScriptRegistry::new());
    for id in [1, 2] {
        s.spawn_unit(Unit::new(UnitId(id), UnitKind::Champion, Team::Blue, Vec2::ZERO, 100));
        s.add_spell(UnitId(id), 0, "Q").unwrap();
    }
    s.cast(UnitId(2), 0, Vec2::X, None).unwrap();
    s.cast(UnitId(1), 0, Vec2::X, None).unwrap();
    s.step_authoritative(250.0);
    let owners: Vec<u32> = s
        .drain_outbound()
        .into_iter()
        .filter_map(|o| match o.msg {
            ServerMsg::SetCooldown { owner, .. } => Some(owner),
            _ => None,
        })
        .collect();
    assert_eq!(owners, vec![1, 2]);
}
