use std::path::Path;
use tempbox::{
    format_remaining, logging, spawn_expiry_sweep, Countdown, CopyIndicator, EmailStatus,
    EngineConfig, MailStore, Mailroom, MemoryClipboard, MessageFilter, TempEmail,
};
use tokio::sync::watch;

fn print_usage() {
    eprintln!("Usage: demo [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --label <text>     Label for the generated address (default: unlabeled)");
    eprintln!("  --filter <name>    Inbox filter: all, otp or social (default: all)");
    eprintln!("  --seed             Start from the demo population instead of empty");
    eprintln!("  --json             Also dump the final state as JSON");
    eprintln!("  --verbose          Verbose logging");
    eprintln!("  --sample-config    Print a sample tempbox.toml");
    eprintln!("  --help             Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TEMPBOX_VERBOSE              Same as --verbose");
    eprintln!("  TEMPBOX_DELIVERY_DELAY_SECS  Override the simulated delivery delay");
}

fn describe_expiry(email: &TempEmail, now: chrono::DateTime<chrono::Utc>) -> String {
    if email.status == EmailStatus::Expired {
        "expired".to_string()
    } else {
        let minutes = (email.expires_at - now).num_minutes().max(0);
        format!("{} min left", minutes)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logging::init_from_env();

    let args: Vec<String> = std::env::args().collect();

    let mut label = String::new();
    let mut filter = MessageFilter::All;
    let mut seed = false;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--sample-config" => {
                println!("{}", EngineConfig::sample());
                return Ok(());
            }
            "--verbose" => logging::set_verbose(true),
            "--seed" => seed = true,
            "--json" => json = true,
            "--label" => {
                i += 1;
                label = args
                    .get(i)
                    .cloned()
                    .ok_or("--label requires a value")?;
            }
            "--filter" => {
                i += 1;
                let value = args.get(i).ok_or("--filter requires a value")?;
                filter = value.parse()?;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = EngineConfig::load(Path::new(".")).await?;
    let store = if seed {
        MailStore::with_demo_data(config.clone())
    } else {
        MailStore::new(config.clone())
    }
    .into_shared();

    let mailroom = Mailroom::new(store.clone(), config.delivery_delay());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = spawn_expiry_sweep(store.clone(), config.sweep_interval(), shutdown_rx);

    // Generate an address, like the generator card does
    let email = store.write().await.create_email(&label);
    mailroom.schedule(email.id).await;
    println!("Generated address: {}", email.address);
    println!("Label:             {}", email.label);

    let countdown = Countdown::start(email.expires_at, config.countdown_tick());
    println!("Expires in:        {}", format_remaining(countdown.remaining()));

    // Copy the address; the indicator resets on its own
    let clipboard = MemoryClipboard::new();
    let indicator = CopyIndicator::new(config.copied_reset());
    indicator.copy(&clipboard, &email.address);
    if indicator.is_copied() {
        println!("Address copied to clipboard");
    }

    println!();
    println!(
        "Waiting {}s for mail to arrive...",
        config.timing.delivery_delay_secs
    );
    tokio::time::sleep(config.delivery_delay() + std::time::Duration::from_millis(500)).await;

    {
        let mut store = store.write().await;
        store.set_filter(filter);
        let first = store.messages().first().map(|m| m.id);
        store.select_message(first);
    }

    {
        let store = store.read().await;
        let page = store.message_page(1);
        println!(
            "Inbox ({:?}, page {}/{}, {} total):",
            store.filter(),
            page.page,
            page.page_count,
            page.total
        );
        for message in &page.messages {
            let marker = if message.is_read { " " } else { "*" };
            let tag = if message.has_otp() { " [OTP]" } else { "" };
            println!("  {} {} - {}{}", marker, message.sender, message.subject, tag);
        }

        if let Some(selected) = store.selected_message() {
            if let Some(otp) = &selected.otp {
                indicator.copy(&clipboard, otp);
                println!();
                println!("Passcode {} copied from \"{}\"", otp, selected.subject);
            }
        }

        println!();
        println!("History:");
        let now = chrono::Utc::now();
        for entry in store.emails() {
            println!(
                "  {}  {:<16} created {}  {}",
                entry.address,
                entry.label,
                entry.created_at.format("%b %d, %Y %H:%M"),
                describe_expiry(entry, now)
            );
        }

        let stats = store.usage_stats();
        println!();
        println!(
            "Stats: {} emails ({} active, {} expired), {} OTP messages, {} unread",
            stats.total_emails,
            stats.active_emails,
            stats.expired_emails,
            stats.otp_messages,
            stats.unread_messages
        );

        if json {
            let dump = serde_json::json!({
                "stats": stats,
                "emails": store.emails(),
                "messages": store.messages(),
            });
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }

    countdown.stop();
    let _ = shutdown_tx.send(true);
    sweep.await?;

    Ok(())
}
