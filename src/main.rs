use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use knx_dpt::util::hex::{decode_hex, format_hex_compact};
use knx_dpt::{
    init_logger, log_info, Catalog, DecodeResult, Decoder, GroupAddress, GroupAddressBook,
};

#[derive(Parser)]
#[command(name = "knx-dpt")]
#[command(about = "CLI tool for decoding KNX datapoint types")]
struct Cli {
    /// KNX master data catalog (JSON)
    #[arg(short, long, env = "KNX_DPT_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a hex payload as the given datapoint type
    Decode {
        #[arg(short, long)]
        dpt: String,
        payload: String,
        #[arg(short, long, env = "KNX_DPT_LOCALE")]
        locale: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Decode a payload with the type configured for a group address
    Group {
        #[arg(short, long)]
        addresses: PathBuf,
        address: String,
        payload: String,
        #[arg(short, long, env = "KNX_DPT_LOCALE")]
        locale: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show how a type identifier resolves and its field layout
    Describe { dpt: String },
}

fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    let catalog_path = cli
        .catalog
        .ok_or_else(|| anyhow!("no catalog given; use --catalog or set KNX_DPT_CATALOG"))?;
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
    log_info(&format!("Catalog has {} main types", catalog.len()));

    match cli.command {
        Commands::Decode {
            dpt,
            payload,
            locale,
            json,
        } => {
            let payload = decode_hex(&payload).context("Invalid payload")?;
            let decoder = Decoder::new(catalog);
            let result = decoder
                .convenience_decode(&payload, dpt.as_str(), locale.as_deref())
                .ok_or_else(|| anyhow!("no datapoint type given"))?;
            print_result(&payload, &result, json)?;
        }
        Commands::Group {
            addresses,
            address,
            payload,
            locale,
            json,
        } => {
            let book = GroupAddressBook::load(&addresses)
                .with_context(|| format!("Failed to load group addresses {}", addresses.display()))?;
            let address: GroupAddress = address.parse()?;
            let entry = book
                .get(address)
                .ok_or_else(|| anyhow!("group address {address} is not configured"))?;
            if let Some(name) = &entry.name {
                println!("{address} {name}");
            }
            let payload = decode_hex(&payload).context("Invalid payload")?;
            let decoder = Decoder::new(catalog);
            let result = book
                .decode(&decoder, address, &payload, locale.as_deref())
                .ok_or_else(|| anyhow!("group address {address} has no datapoint type"))?;
            print_result(&payload, &result, json)?;
        }
        Commands::Describe { dpt } => {
            let resolved = catalog
                .resolve_str(&dpt)
                .ok_or_else(|| anyhow!("DPT could not be found: {dpt}"))?;
            let main = resolved.main;
            println!(
                "{} {} ({} bits)",
                main.id,
                main.text.as_deref().unwrap_or(""),
                main.size_in_bit.map_or("?".to_string(), |bits| bits.to_string())
            );
            match resolved.sub {
                Some(sub) => {
                    println!(
                        "{} {} [{:?}]",
                        sub.id,
                        sub.text.as_deref().unwrap_or(""),
                        resolved.resolution
                    );
                    for (index, format) in sub.format.iter().enumerate() {
                        let width = format
                            .width
                            .or(format.total_bits)
                            .map_or("-".to_string(), |w| w.to_string());
                        println!(
                            "  [{index}] {:<16} {:>3} bits {} {}",
                            format.kind.type_name(),
                            width,
                            format.name.as_deref().unwrap_or(""),
                            format.unit.as_deref().unwrap_or("")
                        );
                    }
                }
                None => println!("no subtypes"),
            }
        }
    }

    Ok(())
}

fn print_result(payload: &[u8], result: &DecodeResult, json: bool) -> Result<()> {
    if json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    println!(
        "{} {} <- {}",
        result.dpt.as_deref().unwrap_or("?"),
        result.type_text.as_deref().unwrap_or(""),
        format_hex_compact(payload)
    );
    for (index, field) in result.fields.iter().enumerate() {
        let mut line = format!("  [{index}] {}", field.value);
        if let Some(unit) = &field.unit {
            line.push_str(&format!(" {unit}"));
        }
        if let Some(interpretation) = &field.interpretation {
            line.push_str(&format!(" ({interpretation})"));
        }
        if let Some(name) = &field.name {
            line.push_str(&format!(" {name}"));
        }
        println!("{line}");
    }
    if let Some(value) = &result.value {
        println!("value: {value}");
    }
    if let Some(err) = &result.err {
        println!("error: {err}");
    }
    Ok(())
}
