use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::info;
use pkmn_core::bag::{Pocket, PocketKind};
use pkmn_core::core_api::{Engine, Game, GameVariant, Session};
use pkmn_core::gb::party::PartyMember;
use pkmn_render::{
    JsonStyle, TextRenderOptions, render_bag_json, render_bag_text, render_creature_audit_json,
    render_creature_audit_text, render_mirage_json, render_mirage_text, render_party_json,
    render_party_text, render_validation_json, render_validation_text,
};
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    #[arg(
        long,
        value_name = "red|blue|yellow|gold|silver|crystal|ruby|sapphire|emerald|firered|leafgreen",
        value_parser = parse_game_variant
    )]
    game: GameVariant,
    #[arg(short = 'j', long)]
    japanese: bool,
    #[arg(long)]
    json: bool,
    /// Also list matching checksums and empty bag slots.
    #[arg(short, long)]
    verbose: bool,
    /// Recompute every checksum.
    #[arg(long)]
    fix: bool,
    /// Audit creature record checksums (Generation 3).
    #[arg(long)]
    creatures: bool,
    /// List bag pockets.
    #[arg(long)]
    bag: bool,
    /// List party members (Generations 1 and 2).
    #[arg(long)]
    party: bool,
    /// Make Mirage Island appear (Ruby/Sapphire/Emerald).
    #[arg(long)]
    mirage: bool,
    #[arg(
        long = "set-item",
        value_name = "POCKET:SLOT:ITEM:QTY",
        value_parser = parse_item_edit
    )]
    set_item: Vec<ItemEdit>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemEdit {
    pocket: PocketKind,
    slot: usize,
    item_id: u16,
    quantity: u16,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter(Some("pkmn_core"), level)
        .init();

    let has_edits = cli.fix || cli.mirage || !cli.set_item.is_empty();
    if has_edits && cli.output.is_none() {
        eprintln!("--fix, --mirage and --set-item require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires --fix, --mirage or --set-item");
        process::exit(2);
    }

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let game = Game::new(cli.game, cli.japanese);
    let mut session = Engine::new().open_bytes(bytes, game).unwrap_or_else(|e| {
        eprintln!("Error opening save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    if cli.fix {
        session.recompute().unwrap_or_else(|e| {
            eprintln!("Error recomputing checksums: {e}");
            process::exit(1);
        });
    }
    for edit in &cli.set_item {
        session
            .set_bag_slot(edit.pocket, edit.slot, edit.item_id, edit.quantity)
            .unwrap_or_else(|e| {
                eprintln!("Error applying item edit: {e}");
                process::exit(1);
            });
    }
    let mirage = if cli.mirage {
        Some(session.apply_mirage_island().unwrap_or_else(|e| {
            eprintln!("Error applying Mirage Island edit: {e}");
            process::exit(1);
        }))
    } else {
        None
    };

    if let Some(out_path) = &cli.output {
        fs::write(out_path, session.as_bytes()).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        info!("wrote {} bytes to {}", session.as_bytes().len(), out_path.display());
    }

    let options = TextRenderOptions {
        verbose: cli.verbose,
    };
    let report = session.validate().unwrap_or_else(|e| {
        eprintln!("Error validating save file: {e}");
        process::exit(1);
    });
    let creatures = cli.creatures.then(|| {
        session.creature_audit().unwrap_or_else(|e| {
            eprintln!("Error auditing creatures: {e}");
            process::exit(1);
        })
    });
    let bag = cli.bag.then(|| bag_or_exit(&session));
    let party = cli.party.then(|| party_or_exit(&session));

    if cli.json {
        let mut out = JsonMap::new();
        out.insert(
            "validation".to_string(),
            render_validation_json(&report, JsonStyle::CanonicalV1),
        );
        if let Some(entries) = &creatures {
            out.insert(
                "creatures".to_string(),
                render_creature_audit_json(entries, JsonStyle::CanonicalV1),
            );
        }
        if let Some(pockets) = &bag {
            out.insert(
                "bag".to_string(),
                render_bag_json(pockets, JsonStyle::CanonicalV1),
            );
        }
        if let Some(members) = &party {
            out.insert(
                "party".to_string(),
                render_party_json(members, JsonStyle::CanonicalV1),
            );
        }
        if let Some(edit) = &mirage {
            out.insert(
                "mirage".to_string(),
                render_mirage_json(edit, JsonStyle::CanonicalV1),
            );
        }
        if let Some(out_path) = &cli.output {
            out.insert(
                "written".to_string(),
                JsonValue::String(out_path.display().to_string()),
            );
        }
        let rendered = serde_json::to_string_pretty(&JsonValue::Object(out)).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    print!("{}", render_validation_text(&report, options));
    if let Some(entries) = &creatures {
        println!();
        print!("{}", render_creature_audit_text(entries, options));
    }
    if let Some(pockets) = &bag {
        println!();
        print!("{}", render_bag_text(pockets, options));
    }
    if let Some(members) = &party {
        println!();
        print!("{}", render_party_text(members));
    }
    if let Some(edit) = &mirage {
        println!();
        print!("{}", render_mirage_text(edit));
    }
    if let Some(out_path) = &cli.output {
        println!("Wrote edited save to {}", out_path.display());
    }
}

fn bag_or_exit(session: &Session) -> Vec<Pocket> {
    session.bag().unwrap_or_else(|e| {
        eprintln!("Error reading bag: {e}");
        process::exit(1);
    })
}

fn party_or_exit(session: &Session) -> Vec<PartyMember> {
    session.party().unwrap_or_else(|e| {
        eprintln!("Error reading party: {e}");
        process::exit(1);
    })
}

fn parse_game_variant(value: &str) -> Result<GameVariant, String> {
    value.parse::<GameVariant>().map_err(|e| e.to_string())
}

fn parse_item_edit(value: &str) -> Result<ItemEdit, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let [pocket, slot, item_id, quantity] = parts.as_slice() else {
        return Err(format!(
            "invalid item edit '{value}', expected POCKET:SLOT:ITEM:QTY"
        ));
    };
    Ok(ItemEdit {
        pocket: pocket.parse::<PocketKind>().map_err(|e| e.to_string())?,
        slot: slot
            .parse()
            .map_err(|_| format!("invalid slot '{slot}' in '{value}'"))?,
        item_id: item_id
            .parse()
            .map_err(|_| format!("invalid item id '{item_id}' in '{value}'"))?,
        quantity: quantity
            .parse()
            .map_err(|_| format!("invalid quantity '{quantity}' in '{value}'"))?,
    })
}
