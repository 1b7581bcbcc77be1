use anyhow::Error;
use arena_admin::{Admin, deadline, models::{DEFAULT_URL, NewBattle}};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "ARENA_URL", default_value = DEFAULT_URL)]
    url: String,

    #[arg(long, env = "ADMIN_PASSWORD", default_value = "devpassword", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the event and every battle
    Show,

    /// Create a battle
    Create {
        option_a: String,

        option_b: String,

        #[arg(long)]
        image_a: String,

        #[arg(long)]
        image_b: String,

        /// RFC 3339 timestamp, e.g. 2026-11-01T18:00:00Z
        #[arg(long, conflicts_with = "closes_in")]
        deadline: Option<DateTime<Utc>>,

        /// Minutes from now
        #[arg(long)]
        closes_in: Option<i64>,
    },

    /// Delete a battle
    Remove { id: u64 },

    /// Rename the event
    Title { title: String },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let admin = Admin::new(&args.url, &args.password);

    match args.command {
        Command::Show => admin.show().await,
        Command::Create {
            option_a,
            option_b,
            image_a,
            image_b,
            deadline: at,
            closes_in,
        } => {
            let battle = NewBattle {
                option_a_name: option_a,
                option_b_name: option_b,
                image_reference_a: image_a,
                image_reference_b: image_b,
                deadline: deadline(at, closes_in, Utc::now())?,
            };

            admin.create(battle).await
        }
        Command::Remove { id } => admin.remove(id).await,
        Command::Title { title } => admin.title(&title).await,
    }
}
