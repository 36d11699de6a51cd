use std::fmt::Write as _;

use pkmn_core::bag::{BagSlot, Pocket};
use pkmn_core::checksum::ChecksumResult;
use pkmn_core::core_api::{BlockReport, ValidationDetail, ValidationReport};
use pkmn_core::gb::party::PartyMember;
use pkmn_core::gen1::BankResult;
use pkmn_core::gen3::BlockId;
use pkmn_core::gen3::creature::CreatureChecksumEntry;
use pkmn_core::gen3::mirage::MirageEdit;
use serde_json::{Map as JsonMap, Value as JsonValue};

const LABEL_WIDTH: usize = 18;
const ADDRESS_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// List matching checksums and empty bag slots too.
    pub verbose: bool,
}

pub fn render_validation_json(report: &ValidationReport, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(validation_json(report)),
    }
}

pub fn render_creature_audit_json(
    entries: &[CreatureChecksumEntry],
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            JsonValue::Array(entries.iter().map(creature_entry_to_json).collect())
        }
    }
}

pub fn render_bag_json(pockets: &[Pocket], style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Array(pockets.iter().map(pocket_to_json).collect()),
    }
}

pub fn render_party_json(members: &[PartyMember], style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Array(members.iter().map(member_to_json).collect()),
    }
}

pub fn render_mirage_json(edit: &MirageEdit, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut m = JsonMap::new();
            m.insert("address".to_string(), JsonValue::String(hex_address(edit.address)));
            m.insert("previous".to_string(), JsonValue::from(edit.previous));
            m.insert("value".to_string(), JsonValue::from(edit.value));
            m.insert(
                "section_checksum".to_string(),
                JsonValue::from(edit.section_checksum),
            );
            JsonValue::Object(m)
        }
    }
}

fn member_to_json(m: &PartyMember) -> JsonValue {
    let mut obj = JsonMap::new();
    obj.insert("slot".to_string(), JsonValue::from(m.slot));
    obj.insert("species".to_string(), JsonValue::from(m.species));
    obj.insert("level".to_string(), JsonValue::from(m.level));
    obj.insert(
        "held_item".to_string(),
        m.held_item.map_or(JsonValue::Null, JsonValue::from),
    );
    obj.insert("current_hp".to_string(), JsonValue::from(m.current_hp));
    obj.insert("max_hp".to_string(), JsonValue::from(m.max_hp));
    obj.insert("experience".to_string(), JsonValue::from(m.experience));
    obj.insert(
        "moves".to_string(),
        JsonValue::Array(m.moves.iter().map(|&mv| JsonValue::from(mv)).collect()),
    );
    obj.insert("trainer_id".to_string(), JsonValue::from(m.trainer_id));
    JsonValue::Object(obj)
}

fn validation_json(report: &ValidationReport) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "game".to_string(),
        JsonValue::String(report.game.variant.as_str().to_string()),
    );
    out.insert("japanese".to_string(), JsonValue::Bool(report.game.japanese));
    out.insert("valid".to_string(), JsonValue::Bool(report.is_valid()));

    match &report.detail {
        ValidationDetail::Gen1 { banks } => {
            out.insert(
                "banks".to_string(),
                JsonValue::Array(banks.iter().map(bank_to_json).collect()),
            );
        }
        ValidationDetail::Gen2 { checksums } => {
            out.insert(
                "checksums".to_string(),
                JsonValue::Array(checksums.iter().map(checksum_to_json).collect()),
            );
        }
        ValidationDetail::Gen3 { blocks, current } => {
            out.insert(
                "current_block".to_string(),
                match current {
                    Some(id) => JsonValue::String(block_name(*id).to_string()),
                    None => JsonValue::Null,
                },
            );
            out.insert(
                "blocks".to_string(),
                JsonValue::Array(blocks.iter().map(block_to_json).collect()),
            );
        }
    }
    out
}

fn checksum_to_json(c: &ChecksumResult) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("location".to_string(), JsonValue::String(hex_address(c.location)));
    m.insert("stored".to_string(), JsonValue::from(c.stored));
    m.insert("computed".to_string(), JsonValue::from(c.computed));
    m.insert("matches".to_string(), JsonValue::Bool(c.matches));
    JsonValue::Object(m)
}

fn bank_to_json(bank: &BankResult) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("name".to_string(), JsonValue::String(bank.name.clone()));
    m.insert("erased".to_string(), JsonValue::Bool(bank.erased));
    m.insert("matches".to_string(), JsonValue::Bool(bank.matches()));
    m.insert(
        "checks".to_string(),
        JsonValue::Array(bank.checks.iter().map(checksum_to_json).collect()),
    );
    JsonValue::Object(m)
}

fn block_to_json(block: &BlockReport) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "block".to_string(),
        JsonValue::String(block_name(block.block).to_string()),
    );
    m.insert(
        "base_address".to_string(),
        JsonValue::String(hex_address(block.base_address)),
    );
    m.insert("save_index".to_string(), JsonValue::from(block.save_index));
    m.insert(
        "structurally_valid".to_string(),
        JsonValue::Bool(block.structurally_valid),
    );
    m.insert("valid".to_string(), JsonValue::Bool(block.valid));
    m.insert(
        "table_error".to_string(),
        match &block.table_error {
            Some(reason) => JsonValue::String(reason.clone()),
            None => JsonValue::Null,
        },
    );
    let sections = block
        .sections
        .iter()
        .map(|s| {
            let mut sm = JsonMap::new();
            sm.insert("slot".to_string(), JsonValue::from(s.slot));
            sm.insert("section_id".to_string(), JsonValue::from(s.section_id));
            sm.insert(
                "base_address".to_string(),
                JsonValue::String(hex_address(s.base_address)),
            );
            sm.insert("stored".to_string(), JsonValue::from(s.stored_checksum));
            sm.insert(
                "computed".to_string(),
                match s.computed_checksum {
                    Some(v) => JsonValue::from(v),
                    None => JsonValue::Null,
                },
            );
            sm.insert("matches".to_string(), JsonValue::Bool(s.matches()));
            JsonValue::Object(sm)
        })
        .collect();
    m.insert("sections".to_string(), JsonValue::Array(sections));
    JsonValue::Object(m)
}

fn creature_entry_to_json(e: &CreatureChecksumEntry) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "block".to_string(),
        JsonValue::String(block_name(e.block).to_string()),
    );
    m.insert("slot".to_string(), JsonValue::String(e.label.clone()));
    m.insert("pid".to_string(), JsonValue::from(e.pid));
    m.insert(
        "checksum_address".to_string(),
        JsonValue::String(hex_address(e.checksum_address)),
    );
    m.insert("stored".to_string(), JsonValue::from(e.stored));
    m.insert("computed".to_string(), JsonValue::from(e.computed));
    m.insert("valid".to_string(), JsonValue::Bool(e.valid));
    JsonValue::Object(m)
}

fn pocket_to_json(p: &Pocket) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("pocket".to_string(), JsonValue::String(p.kind.to_string()));
    m.insert("capacity".to_string(), JsonValue::from(p.capacity));
    m.insert(
        "slots".to_string(),
        JsonValue::Array(
            p.slots
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s: &BagSlot| {
                    let mut sm = JsonMap::new();
                    sm.insert("index".to_string(), JsonValue::from(s.index));
                    sm.insert("item_id".to_string(), JsonValue::from(s.item_id));
                    sm.insert("quantity".to_string(), JsonValue::from(s.quantity));
                    JsonValue::Object(sm)
                })
                .collect(),
        ),
    );
    JsonValue::Object(m)
}

pub fn render_validation_text(report: &ValidationReport, options: TextRenderOptions) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Game: {}", report.game).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Status: {}",
        if report.is_valid() { "OK" } else { "INVALID" }
    )
    .expect("writing to String cannot fail");

    match &report.detail {
        ValidationDetail::Gen1 { banks } => {
            for bank in banks {
                let state = if bank.erased {
                    "erased"
                } else if bank.matches() {
                    "ok"
                } else {
                    "MISMATCH"
                };
                writeln!(&mut out, "  {:<LABEL_WIDTH$}{state}", bank.name)
                    .expect("writing to String cannot fail");
                for check in &bank.checks {
                    if options.verbose || !check.matches {
                        write_checksum_line(&mut out, check);
                    }
                }
            }
        }
        ValidationDetail::Gen2 { checksums } => {
            for (index, check) in checksums.iter().enumerate() {
                writeln!(
                    &mut out,
                    "  {:<LABEL_WIDTH$}{}",
                    format!("Checksum {}", index + 1),
                    if check.matches { "ok" } else { "MISMATCH" }
                )
                .expect("writing to String cannot fail");
                if options.verbose || !check.matches {
                    write_checksum_line(&mut out, check);
                }
            }
        }
        ValidationDetail::Gen3 { blocks, current } => {
            writeln!(
                &mut out,
                "Current block: {}",
                current.map_or("none (indeterminate)", block_name)
            )
            .expect("writing to String cannot fail");
            for block in blocks {
                write_block(&mut out, block, options);
            }
        }
    }
    out
}

fn write_checksum_line(out: &mut String, check: &ChecksumResult) {
    writeln!(
        out,
        "    at {:<ADDRESS_WIDTH$}stored {:#06x}  computed {:#06x}",
        hex_address(check.location),
        check.stored,
        check.computed
    )
    .expect("writing to String cannot fail");
}

fn write_block(out: &mut String, block: &BlockReport, options: TextRenderOptions) {
    let state = if block.valid {
        "ok".to_string()
    } else if let Some(reason) = &block.table_error {
        format!("MALFORMED ({reason})")
    } else {
        "MISMATCH".to_string()
    };
    writeln!(
        out,
        "  Block {} @ {:<ADDRESS_WIDTH$}save index {:<12}{state}",
        block_name(block.block),
        hex_address(block.base_address),
        block.save_index
    )
    .expect("writing to String cannot fail");

    for s in &block.sections {
        if !options.verbose && s.matches() {
            continue;
        }
        let computed = match s.computed_checksum {
            Some(v) => format!("{v:#06x}"),
            None => "n/a".to_string(),
        };
        writeln!(
            out,
            "    slot {:>2} id {:>2} @ {:<ADDRESS_WIDTH$}stored {:#06x}  computed {computed}",
            s.slot,
            s.section_id,
            hex_address(s.base_address),
            s.stored_checksum
        )
        .expect("writing to String cannot fail");
    }
}

pub fn render_creature_audit_text(
    entries: &[CreatureChecksumEntry],
    options: TextRenderOptions,
) -> String {
    let mut out = String::new();
    let invalid = entries.iter().filter(|e| !e.valid).count();
    writeln!(
        &mut out,
        "Creatures checked: {}  invalid: {invalid}",
        entries.len()
    )
    .expect("writing to String cannot fail");
    for e in entries {
        if !options.verbose && e.valid {
            continue;
        }
        writeln!(
            &mut out,
            "  [{}] {:<LABEL_WIDTH$}@ {:<ADDRESS_WIDTH$}stored {:#06x}  computed {:#06x}  {}",
            block_name(e.block),
            e.label,
            hex_address(e.checksum_address),
            e.stored,
            e.computed,
            if e.valid { "ok" } else { "MISMATCH" }
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn render_bag_text(pockets: &[Pocket], options: TextRenderOptions) -> String {
    let mut out = String::new();
    for pocket in pockets {
        let used = pocket.slots.iter().filter(|s| !s.is_empty()).count();
        writeln!(&mut out, "{} ({used}/{})", pocket.kind, pocket.capacity)
            .expect("writing to String cannot fail");
        for slot in &pocket.slots {
            if !options.verbose && slot.is_empty() {
                continue;
            }
            writeln!(
                &mut out,
                "  {:>3}  item {:>5}  x{}",
                slot.index, slot.item_id, slot.quantity
            )
            .expect("writing to String cannot fail");
        }
    }
    out
}

pub fn render_party_text(members: &[PartyMember]) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Party ({}/6)", members.len()).expect("writing to String cannot fail");
    for m in members {
        write!(
            &mut out,
            "  {}  species {:>3}  Lv {:>3}  HP {}/{}  exp {}",
            m.slot, m.species, m.level, m.current_hp, m.max_hp, m.experience
        )
        .expect("writing to String cannot fail");
        if let Some(item) = m.held_item.filter(|&item| item != 0) {
            write!(&mut out, "  holds {item}").expect("writing to String cannot fail");
        }
        out.push('\n');
    }
    out
}

pub fn render_mirage_text(edit: &MirageEdit) -> String {
    format!(
        "Mirage Island value at {}: {:#06x} -> {:#06x} (section checksum {:#06x})\n",
        hex_address(edit.address),
        edit.previous,
        edit.value,
        edit.section_checksum
    )
}

fn block_name(id: BlockId) -> &'static str {
    match id {
        BlockId::A => "A",
        BlockId::B => "B",
    }
}

fn hex_address(address: usize) -> String {
    format!("{address:#07x}")
}
