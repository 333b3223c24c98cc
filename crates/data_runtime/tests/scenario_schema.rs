use data_runtime::scenario::{Command, Scenario};

#[test]
fn parses_commands_with_tags() {
    let txt = r#"{
        "name": "duel",
        "units": [
            { "id": 1, "team": 1, "pos": [0, 0], "spells": ["Bolt"] },
            { "id": 2, "kind": "minion", "team": 2, "pos": [300, 0] }
        ],
        "commands": [
            { "op": "level_up", "at_tick": 0, "unit": 1, "slot": 0 },
            { "op": "cast", "at_tick": 1, "unit": 1, "slot": 0, "pos": [300, 0], "target": 2 }
        ]
    }"#;
    let scn: Scenario = serde_json::from_str(txt).expect("parse");
    assert_eq!(scn.ticks, 300);
    assert_eq!(scn.units[1].kind, "minion");
    assert_eq!(scn.units[0].hp, 100);
    assert_eq!(scn.commands[1].at_tick(), 1);
    assert!(matches!(scn.commands[1], Command::Cast { target: Some(2), .. }));
}
