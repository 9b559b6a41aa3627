//! r2m2 command line
//!
//! Drives the decode and encode bridges without a host.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use r2m2_assembler::assemble_block;
use r2m2_core::available_machines;
use r2m2_disassembler::disassemble_block;
use r2m2_plugin::{parse_hex, PluginConfig, PluginError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "r2m2", author, version, about = "x86 disassembler/assembler bridge")]
struct Cli {
    /// Machine name; falls back to R2M2_ARCH
    #[arg(long, global = true)]
    arch: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Disassemble hex bytes
    Dis {
        /// Address of the first byte
        #[arg(long, default_value = "0", value_parser = parse_address)]
        address: u64,

        /// Bytes as hex, e.g. `eb03` or `"eb 03"`
        hex: String,
    },
    /// Assemble instructions, one per argument
    Asm {
        /// Address of the first instruction
        #[arg(long, default_value = "0", value_parser = parse_address)]
        address: u64,

        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List available machines
    Archs,
}

fn parse_address(text: &str) -> std::result::Result<u64, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|err| format!("invalid address '{}': {}", text, err))
}

fn config(cli_arch: Option<String>) -> PluginConfig {
    match cli_arch {
        Some(arch) => PluginConfig::default().with_arch(arch),
        None => PluginConfig::from_env(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Archs => {
            for name in available_machines() {
                println!("{}", name);
            }
        }
        Command::Dis { address, hex } => {
            let ctx = config(cli.arch).context().map_err(PluginError::from)?;
            let bytes = parse_hex(&hex)?;
            print!("{}", disassemble_block(&ctx, address, &bytes));
        }
        Command::Asm { address, text } => {
            let ctx = config(cli.arch).context().map_err(PluginError::from)?;
            let source = text.join("\n");
            let code = assemble_block(&ctx, address, &source)
                .map_err(PluginError::from)
                .with_context(|| format!("cannot assemble at {:#x}", address))?;
            let hex: String = code.iter().map(|b| format!("{:02x}", b)).collect();
            println!("{}", hex);
        }
    }

    Ok(())
}
