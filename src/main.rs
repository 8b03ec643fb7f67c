use anyhow::{Context, Result};
use colored::Colorize;
use income_analyzer::api_server_axum::{self, AppState};
use income_analyzer::config::{self, SelectorConfig};
use income_analyzer::logging;
use income_analyzer::rag::{self, TextChunker};
use income_analyzer::strikes::{self, AgentSignal, DeltaCriteria, OptionChain, OptionSide};
use income_analyzer::utility::{timed, Timer};
use std::path::Path;

fn banner(title: &str) {
    println!("{}", "=".repeat(60).blue());
    println!("{}", title.green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();
}

/// Load the chain file named by INCOME_CHAIN_FILE
fn load_chain() -> Result<OptionChain> {
    let path = config::get_chain_file();
    let json = std::fs::read_to_string(&path).with_context(|| format!("Failed to read chain file {}", path))?;
    let today = chrono::Local::now().date_naive();
    let chain = timed("load_chain", || strikes::parse_option_chain(&json, today))
        .with_context(|| format!("Invalid option chain in {}", path))?;

    println!(
        "{} {} → {} calls, {} puts, underlying {:.2}, {} DTE",
        "✓".green(),
        chain.symbol.yellow(),
        chain.calls.len(),
        chain.puts.len(),
        chain.underlying_price,
        chain.dte
    );
    println!();
    Ok(chain)
}

fn parse_side() -> Result<OptionSide> {
    Ok(config::get_side().parse::<OptionSide>()?)
}

/// Pick the single best strike for the configured side and target delta
fn run_select(selector: &SelectorConfig) -> Result<()> {
    banner("Optimal Strike Selection");

    let chain = load_chain()?;
    let side = parse_side()?;
    let target_delta = config::get_target_delta();

    println!("{} Side: {} ({})", "→".cyan(), side.to_string().yellow(), side.strategy());
    println!("{} Target delta: {:.2}", "→".cyan(), target_delta);
    println!();

    match strikes::select_optimal_strike(chain.side(side), side, target_delta, Some(chain.underlying_price), selector) {
        Some(optimal) => {
            println!("{} Strike: {:.2}", "✓".green(), optimal.quote.strike);
            println!("{} Delta: {:.3}", "✓".green(), optimal.quote.delta);
            println!("{} Mid price: {:.2} ({:.2} per contract)", "✓".green(), optimal.quote.mid_price, optimal.premium_per_contract);
            println!("{} Annual return: {:.2}%", "✓".green(), optimal.annual_return * 100.0);
            println!("{} Over risk-free: {:.2}%", "✓".green(), optimal.return_over_risk_free * 100.0);
            println!("{} Breakeven: {:.2}", "✓".green(), optimal.breakeven);
            println!("{} IV: {:.1}%  Theta: {:.3}", "ℹ".blue(), optimal.implied_volatility * 100.0, optimal.theta);
            println!("{} {}", "ℹ".blue(), optimal.reason);
        }
        None => println!("{} No out-of-the-money strike available", "✗".red()),
    }

    Ok(())
}

/// Print the top strikes by income score
fn run_rank(selector: &SelectorConfig) -> Result<()> {
    banner("Income Strike Ranking");

    let chain = load_chain()?;
    let side = parse_side()?;
    let top_n = config::get_top_n();

    let ranked = strikes::rank_strikes_for_income(chain.side(side), side, top_n, selector);
    if ranked.is_empty() {
        println!("{} No out-of-the-money strikes to rank", "✗".red());
        return Ok(());
    }

    println!(
        "  {:>4}  {:>9}  {:>7}  {:>7}  {:>9}  {:>6}",
        "#", "strike", "delta", "mid", "yield", "score"
    );
    for (idx, row) in ranked.iter().enumerate() {
        println!(
            "  {:>4}  {:>9.2}  {:>7.3}  {:>7.2}  {:>8.2}%  {:>6.3}",
            idx + 1,
            row.quote.strike,
            row.quote.delta,
            row.quote.mid_price,
            row.annual_yield * 100.0,
            row.income_score
        );
    }

    Ok(())
}

/// Delta window filter with default thresholds
fn run_filter() -> Result<()> {
    banner("Delta Window Filter");

    let chain = load_chain()?;
    let side = parse_side()?;
    let criteria = DeltaCriteria::default();

    let filtered = strikes::filter_by_delta(chain.side(side), side, &criteria)?;
    println!(
        "{} {} of {} rows within |delta| [{:.2}, {:.2}]",
        "ℹ".blue(),
        filtered.len(),
        chain.side(side).len(),
        criteria.min_delta,
        criteria.max_delta
    );
    for quote in &filtered {
        println!(
            "  {} {:>9.2}  delta {:>7.3}  mid {:>7.2}",
            "•".cyan(),
            quote.strike,
            quote.delta,
            quote.mid_price
        );
    }

    Ok(())
}

/// Feed an agent signal file into strike selection
fn run_signal(selector: &SelectorConfig) -> Result<()> {
    banner("Agent Signal Bridge");

    let path = config::get_signal_file();
    let signal: AgentSignal = serde_json::from_str(
        &std::fs::read_to_string(&path).with_context(|| format!("Failed to read signal file {}", path))?,
    )
    .with_context(|| format!("Invalid signal in {}", path))?;
    let chain = load_chain()?;

    let batch = vec![(signal, chain)];
    let recommendations = strikes::recommend_batch(&batch, selector);

    if recommendations.is_empty() {
        println!("{} No trade for this signal", "ℹ".blue());
        return Ok(());
    }

    for rec in recommendations {
        println!(
            "{} {} {:?} ({:.0}% confidence) → {} at {:.2} delta",
            "→".cyan(),
            rec.ticker.yellow(),
            rec.direction,
            rec.confidence * 100.0,
            rec.strategy,
            rec.target_delta
        );
        match rec.strike {
            Some(strike) => println!(
                "{} Strike {:.2}, annual return {:.2}%, breakeven {:.2}",
                "✓".green(),
                strike.quote.strike,
                strike.annual_return * 100.0,
                strike.breakeven
            ),
            None => println!("{} No matching strike on the chain", "✗".red()),
        }
    }

    Ok(())
}

/// Chunk a text file and write chunks.json
fn run_chunk() -> Result<()> {
    banner("Document Chunking");

    let path = config::get_text_file();
    let text = std::fs::read_to_string(&path).with_context(|| format!("Failed to read text file {}", path))?;
    let source = config::get_source().unwrap_or_else(|| {
        Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.clone())
    });

    let chunker = TextChunker::new(config::get_chunk_size(), config::get_chunk_overlap())?;
    let timer = Timer::start("chunk_document");
    let pages = rag::split_pages(&text);
    let chunks = if pages.len() > 1 {
        chunker.chunk_document(&pages, &source)
    } else {
        chunker.chunk_text(&text, &source, 0)
    };
    let elapsed = timer.stop();

    std::fs::write("chunks.json", serde_json::to_string_pretty(&chunks)?)?;

    println!("{} Source: {}", "✓".green(), source.yellow());
    println!("{} Pages: {}", "✓".green(), pages.len());
    println!("{} Chunks: {}", "✓".green(), chunks.len());
    println!("{} Time taken: {:.2}s", "⏱".yellow(), elapsed.as_secs_f64());
    println!("{} Saved chunks to chunks.json", "✓".green());

    Ok(())
}

async fn run_server(port: u16, selector: SelectorConfig) -> Result<()> {
    banner("Income Analyzer API Server");

    let chunker = TextChunker::new(config::get_chunk_size(), config::get_chunk_overlap())?;
    api_server_axum::start_server(port, AppState::new(selector, chunker)).await
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging(&config::get_log_dir())?;

    let mode = config::get_execution_mode();
    let selector = SelectorConfig::from_env();

    match mode.as_str() {
        "select" => run_select(&selector)?,
        "rank" => run_rank(&selector)?,
        "filter" => run_filter()?,
        "signal" => run_signal(&selector)?,
        "chunk" => run_chunk()?,
        "server" => run_server(config::get_port(), selector).await?,
        _ => {
            eprintln!("Invalid mode '{}'. Use 'select', 'rank', 'filter', 'signal', 'chunk' or 'server'", mode);
            eprintln!("Set INCOME_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  INCOME_MODE=select INCOME_CHAIN_FILE=chain.json INCOME_SIDE=put INCOME_TARGET_DELTA=0.25 cargo run");
            eprintln!("  INCOME_MODE=rank INCOME_CHAIN_FILE=chain.json INCOME_SIDE=call INCOME_TOP_N=5 cargo run");
            eprintln!("  INCOME_MODE=signal INCOME_SIGNAL_FILE=signal.json INCOME_CHAIN_FILE=chain.json cargo run");
            eprintln!("  INCOME_MODE=chunk INCOME_TEXT_FILE=report.txt INCOME_SOURCE=report cargo run");
            eprintln!("  INCOME_MODE=server INCOME_PORT=3001 cargo run");
            std::process::exit(1);
        }
    }

    Ok(())
}
