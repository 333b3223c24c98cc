//! Server->client gameplay notifications. One variant per kind of
//! authoritative mutation the server replicates.

use crate::codec::{
    SnapshotDecode, SnapshotEncode, put_bool, put_bytes, put_f32, put_i32, put_opt_u32, put_str,
    put_u8, put_u32, put_vec2, take_bool, take_bytes, take_f32, take_i32, take_opt_u32, take_str,
    take_u8, take_u32, take_vec2,
};

pub const TAG_SERVER_MSG: u8 = 0xA1;

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMsg {
    SetCooldown {
        owner: u32,
        slot: u8,
        current: f32,
        max: f32,
    },
    AddBuff {
        target: u32,
        source: u32,
        slot: u8,
        name: String,
        stacks: u8,
        duration: f32,
    },
    RemoveBuff {
        target: u32,
        slot: u8,
        name: String,
    },
    ParticleSpawn {
        net_id: u32,
        owner: u32,
        name: String,
        target_unit: Option<u32>,
        target_pos: [f32; 2],
        size: f32,
        bone: String,
    },
    ParticleDestroy {
        net_id: u32,
    },
    ProjectileSpawn {
        net_id: u32,
        owner: u32,
        ability_id: u32,
        name: String,
        from: [f32; 2],
        target_unit: Option<u32>,
        target_pos: [f32; 2],
        speed: f32,
        width: f32,
        flags: u32,
    },
    ProjectileDestroy {
        net_id: u32,
    },
    Teleport {
        unit: u32,
        pos: [f32; 2],
    },
    SpellAnimation {
        unit: u32,
        name: String,
    },
    SetAnimation {
        unit: u32,
        names: Vec<String>,
    },
    FaceDirection {
        unit: u32,
        dir: [f32; 2],
        instant: bool,
        turn_time: f32,
    },
    Dash {
        unit: u32,
        target_unit: Option<u32>,
        target_pos: [f32; 2],
        speed: f32,
        keep_facing: bool,
        leap_height: f32,
        follow_max_distance: f32,
        back_distance: f32,
        travel_time: f32,
    },
    Visibility {
        unit: u32,
        visible: bool,
    },
    SetModel {
        unit: u32,
        model: String,
    },
    DebugMessage {
        text: String,
    },
    Raw {
        bytes: Vec<u8>,
    },
    Damage {
        source: u32,
        target: u32,
        amount: i32,
        hp_after: i32,
    },
}

impl ServerMsg {
    /// Stable short name used for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMsg::SetCooldown { .. } => "set_cooldown",
            ServerMsg::AddBuff { .. } => "add_buff",
            ServerMsg::RemoveBuff { .. } => "remove_buff",
            ServerMsg::ParticleSpawn { .. } => "particle_spawn",
            ServerMsg::ParticleDestroy { .. } => "particle_destroy",
            ServerMsg::ProjectileSpawn { .. } => "projectile_spawn",
            ServerMsg::ProjectileDestroy { .. } => "projectile_destroy",
            ServerMsg::Teleport { .. } => "teleport",
            ServerMsg::SpellAnimation { .. } => "spell_animation",
            ServerMsg::SetAnimation { .. } => "set_animation",
            ServerMsg::FaceDirection { .. } => "face_direction",
            ServerMsg::Dash { .. } => "dash",
            ServerMsg::Visibility { .. } => "visibility",
            ServerMsg::SetModel { .. } => "set_model",
            ServerMsg::DebugMessage { .. } => "debug_message",
            ServerMsg::Raw { .. } => "raw",
            ServerMsg::Damage { .. } => "damage",
        }
    }

    fn op(&self) -> u8 {
        match self {
            ServerMsg::SetCooldown { .. } => 0,
            ServerMsg::AddBuff { .. } => 1,
            ServerMsg::RemoveBuff { .. } => 2,
            ServerMsg::ParticleSpawn { .. } => 3,
            ServerMsg::ParticleDestroy { .. } => 4,
            ServerMsg::ProjectileSpawn { .. } => 5,
            ServerMsg::ProjectileDestroy { .. } => 6,
            ServerMsg::Teleport { .. } => 7,
            ServerMsg::SpellAnimation { .. } => 8,
            ServerMsg::SetAnimation { .. } => 9,
            ServerMsg::FaceDirection { .. } => 10,
            ServerMsg::Dash { .. } => 11,
            ServerMsg::Visibility { .. } => 12,
            ServerMsg::SetModel { .. } => 13,
            ServerMsg::DebugMessage { .. } => 14,
            ServerMsg::Raw { .. } => 15,
            ServerMsg::Damage { .. } => 16,
        }
    }
}

impl SnapshotEncode for ServerMsg {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_SERVER_MSG);
        out.push(self.op());
        match self {
            ServerMsg::SetCooldown { owner, slot, current, max } => {
                put_u32(out, *owner);
                put_u8(out, *slot);
                put_f32(out, *current);
                put_f32(out, *max);
            }
            ServerMsg::AddBuff { target, source, slot, name, stacks, duration } => {
                put_u32(out, *target);
                put_u32(out, *source);
                put_u8(out, *slot);
                put_str(out, name);
                put_u8(out, *stacks);
                put_f32(out, *duration);
            }
            ServerMsg::RemoveBuff { target, slot, name } => {
                put_u32(out, *target);
                put_u8(out, *slot);
                put_str(out, name);
            }
            ServerMsg::ParticleSpawn { net_id, owner, name, target_unit, target_pos, size, bone } => {
                put_u32(out, *net_id);
                put_u32(out, *owner);
                put_str(out, name);
                put_opt_u32(out, *target_unit);
                put_vec2(out, *target_pos);
                put_f32(out, *size);
                put_str(out, bone);
            }
            ServerMsg::ParticleDestroy { net_id } | ServerMsg::ProjectileDestroy { net_id } => {
                put_u32(out, *net_id);
            }
            ServerMsg::ProjectileSpawn {
                net_id,
                owner,
                ability_id,
                name,
                from,
                target_unit,
                target_pos,
                speed,
                width,
                flags,
            } => {
                put_u32(out, *net_id);
                put_u32(out, *owner);
                put_u32(out, *ability_id);
                put_str(out, name);
                put_vec2(out, *from);
                put_opt_u32(out, *target_unit);
                put_vec2(out, *target_pos);
                put_f32(out, *speed);
                put_f32(out, *width);
                put_u32(out, *flags);
            }
            ServerMsg::Teleport { unit, pos } => {
                put_u32(out, *unit);
                put_vec2(out, *pos);
            }
            ServerMsg::SpellAnimation { unit, name } => {
                put_u32(out, *unit);
                put_str(out, name);
            }
            ServerMsg::SetAnimation { unit, names } => {
                put_u32(out, *unit);
                let n = u8::try_from(names.len()).unwrap_or(u8::MAX);
                put_u8(out, n);
                for s in names.iter().take(usize::from(n)) {
                    put_str(out, s);
                }
            }
            ServerMsg::FaceDirection { unit, dir, instant, turn_time } => {
                put_u32(out, *unit);
                put_vec2(out, *dir);
                put_bool(out, *instant);
                put_f32(out, *turn_time);
            }
            ServerMsg::Dash {
                unit,
                target_unit,
                target_pos,
                speed,
                keep_facing,
                leap_height,
                follow_max_distance,
                back_distance,
                travel_time,
            } => {
                put_u32(out, *unit);
                put_opt_u32(out, *target_unit);
                put_vec2(out, *target_pos);
                put_f32(out, *speed);
                put_bool(out, *keep_facing);
                put_f32(out, *leap_height);
                put_f32(out, *follow_max_distance);
                put_f32(out, *back_distance);
                put_f32(out, *travel_time);
            }
            ServerMsg::Visibility { unit, visible } => {
                put_u32(out, *unit);
                put_bool(out, *visible);
            }
            ServerMsg::SetModel { unit, model } => {
                put_u32(out, *unit);
                put_str(out, model);
            }
            ServerMsg::DebugMessage { text } => put_str(out, text),
            ServerMsg::Raw { bytes } => put_bytes(out, bytes),
            ServerMsg::Damage { source, target, amount, hp_after } => {
                put_u32(out, *source);
                put_u32(out, *target);
                put_i32(out, *amount);
                put_i32(out, *hp_after);
            }
        }
    }
}

impl SnapshotDecode for ServerMsg {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        let tag = take_u8(inp)?;
        if tag != TAG_SERVER_MSG {
            anyhow::bail!("not a server msg tag: {tag:#04x}");
        }
        let op = take_u8(inp)?;
        Ok(match op {
            0 => ServerMsg::SetCooldown {
                owner: take_u32(inp)?,
                slot: take_u8(inp)?,
                current: take_f32(inp)?,
                max: take_f32(inp)?,
            },
            1 => ServerMsg::AddBuff {
                target: take_u32(inp)?,
                source: take_u32(inp)?,
                slot: take_u8(inp)?,
                name: take_str(inp)?,
                stacks: take_u8(inp)?,
                duration: take_f32(inp)?,
            },
            2 => ServerMsg::RemoveBuff {
                target: take_u32(inp)?,
                slot: take_u8(inp)?,
                name: take_str(inp)?,
            },
            3 => ServerMsg::ParticleSpawn {
                net_id: take_u32(inp)?,
                owner: take_u32(inp)?,
                name: take_str(inp)?,
                target_unit: take_opt_u32(inp)?,
                target_pos: take_vec2(inp)?,
                size: take_f32(inp)?,
                bone: take_str(inp)?,
            },
            4 => ServerMsg::ParticleDestroy { net_id: take_u32(inp)? },
            5 => ServerMsg::ProjectileSpawn {
                net_id: take_u32(inp)?,
                owner: take_u32(inp)?,
                ability_id: take_u32(inp)?,
                name: take_str(inp)?,
                from: take_vec2(inp)?,
                target_unit: take_opt_u32(inp)?,
                target_pos: take_vec2(inp)?,
                speed: take_f32(inp)?,
                width: take_f32(inp)?,
                flags: take_u32(inp)?,
            },
            6 => ServerMsg::ProjectileDestroy { net_id: take_u32(inp)? },
            7 => ServerMsg::Teleport {
                unit: take_u32(inp)?,
                pos: take_vec2(inp)?,
            },
            8 => ServerMsg::SpellAnimation {
                unit: take_u32(inp)?,
                name: take_str(inp)?,
            },
            9 => {
                let unit = take_u32(inp)?;
                let n = take_u8(inp)?;
                let mut names = Vec::with_capacity(usize::from(n));
                for _ in 0..n {
                    names.push(take_str(inp)?);
                }
                ServerMsg::SetAnimation { unit, names }
            }
            10 => ServerMsg::FaceDirection {
                unit: take_u32(inp)?,
                dir: take_vec2(inp)?,
                instant: take_bool(inp)?,
                turn_time: take_f32(inp)?,
            },
            11 => ServerMsg::Dash {
                unit: take_u32(inp)?,
                target_unit: take_opt_u32(inp)?,
                target_pos: take_vec2(inp)?,
                speed: take_f32(inp)?,
                keep_facing: take_bool(inp)?,
                leap_height: take_f32(inp)?,
                follow_max_distance: take_f32(inp)?,
                back_distance: take_f32(inp)?,
                travel_time: take_f32(inp)?,
            },
            12 => ServerMsg::Visibility {
                unit: take_u32(inp)?,
                visible: take_bool(inp)?,
            },
            13 => ServerMsg::SetModel {
                unit: take_u32(inp)?,
                model: take_str(inp)?,
            },
            14 => ServerMsg::DebugMessage { text: take_str(inp)? },
            15 => ServerMsg::Raw { bytes: take_bytes(inp)? },
            16 => ServerMsg::Damage {
                source: take_u32(inp)?,
                target: take_u32(inp)?,
                amount: take_i32(inp)?,
                hp_after: take_i32(inp)?,
            },
            other => anyhow::bail!("unknown server msg op: {other}"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_foreign_tag_and_unknown_op() {
        let mut inp: &[u8] = &[0xC1, 0];
        assert!(ServerMsg::decode(&mut inp).is_err());
        let mut inp: &[u8] = &[TAG_SERVER_MSG, 99];
        assert!(ServerMsg::decode(&mut inp).is_err());
    }

    #[test]
    fn cooldown_layout_is_compact() {
        let m = ServerMsg::SetCooldown { owner: 3, slot: 1, current: 8.0, max: 8.0 };
        let mut buf = Vec::new();
        m.encode(&mut buf);
        // tag + op + u32 + u8 + 2 * f32
        assert_eq!(buf.len(), 2 + 4 + 1 + 8);
        let mut inp: &[u8] = &buf;
        assert_eq!(ServerMsg::decode(&mut inp).unwrap(), m);
        assert!(inp.is_empty());
    }
}
