mod api;
mod cart;

use std::io::{self, BufRead, Write};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use crate::api::{Api, Meal, ReceiptSummary};
use crate::cart::{Cart, Course, ADDITIONAL};

#[derive(Parser, Debug)]
#[command(name = "cafeteria")]
#[command(about = "client cli used to order meals and manage receipts", version, long_about = None
)]
struct Cli {
    #[arg(long, global = true, default_value = HOST, help = "Server address")]
    host: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// print the catalog grouped by menu
    Menu,
    /// catalog related ops
    #[command(arg_required_else_help = true)]
    Meal(MealArgs),
    /// pick meals and generate a receipt
    Order(OrderArgs),
    /// receipt related ops
    #[command(arg_required_else_help = true)]
    Receipts(ReceiptArgs),
}

#[derive(Debug, Args)]
struct MealArgs {
    #[command(subcommand)]
    command: MealCmds,
}

#[derive(Debug, Subcommand)]
enum MealCmds {
    #[command(arg_required_else_help = true)]
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type", help = "breakfast, lunch, dinner or additional")]
        category: String,
        #[arg(long)]
        price: f64,
    },
    #[command(arg_required_else_help = true)]
    Remove {
        #[arg(help = "Id of the meal to remove.", value_name = "MEAL_ID")]
        id: i64,
    },
}

#[derive(Debug, Args)]
struct OrderArgs {
    #[arg(long, value_name = "MEAL")]
    breakfast: Option<String>,
    #[arg(long, value_name = "MEAL")]
    lunch: Option<String>,
    #[arg(long, value_name = "MEAL")]
    dinner: Option<String>,
    #[arg(long, help = "Additional meal, repeat to add more.", value_name = "MEAL")]
    additional: Vec<String>,
    #[arg(short, long, help = "Skip reviewing the order before it is placed.")]
    yes: bool,
}

#[derive(Debug, Args)]
struct ReceiptArgs {
    #[command(subcommand)]
    command: ReceiptCmds,
}

#[derive(Debug, Subcommand)]
enum ReceiptCmds {
    List,
    #[command(arg_required_else_help = true)]
    Update {
        receipt_number: String,
        #[arg(long, help = "Replacement orders as a JSON array, prompted for when absent.", value_name = "JSON")]
        orders: Option<String>,
    },
    #[command(arg_required_else_help = true)]
    Delete {
        receipt_number: String,
        #[arg(short, long, help = "Skip the confirmation prompt.")]
        yes: bool,
    },
}

const HOST: &str = "http://localhost:8080";

fn find<'a>(meals: &'a [Meal], menu: &str, name: &str) -> anyhow::Result<&'a Meal> {
    meals
        .iter()
        .find(|m| m.category == menu && m.name.eq_ignore_ascii_case(name.trim()))
        .with_context(|| format!("no {} meal named {:?} on the menu", menu, name))
}

fn render_cart(cart: &Cart) {
    let mut additional = 0;
    for item in cart.line_items() {
        let label = if item.category == ADDITIONAL {
            additional += 1;
            format!("#{additional}")
        } else {
            String::new()
        };
        println!("  {:<3} {:<10} {:<12} ${:.2}", label, item.category, item.name, item.price);
    }
    println!("Total Price: ${:.2}", cart.total());
}

fn render_receipts(receipts: &[ReceiptSummary]) {
    if receipts.is_empty() {
        println!("no receipts yet");
    }
    for receipt in receipts {
        println!("Receipt ID: {}", receipt.receipt_id);
        println!("Timestamp: {}", receipt.timestamp);
        for item in &receipt.orders {
            println!("  {}: {} - ${:.2}", item.category, item.name, item.price);
        }
        println!("Total Price: ${:.2}", receipt.total_price);
        println!();
    }
}

fn prompt(question: &str) -> io::Result<String> {
    print!("{question} ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Apply one review answer: a course name clears it, `#n` or `n` drops the n-th additional meal.
fn edit(cart: &mut Cart, answer: &str) -> Result<(), String> {
    if let Some(course) = Course::ALL.into_iter().find(|c| c.menu().eq_ignore_ascii_case(answer)) {
        cart.clear(course);
        return Ok(());
    }
    let index = answer
        .trim_start_matches('#')
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| format!("unrecognized input {answer:?}"))?;
    cart.remove_additional(index)
        .map(|_| ())
        .ok_or_else(|| format!("no additional meal {answer}"))
}

/// Edit the cart until the user confirms with an empty line.
fn review(cart: &mut Cart) -> io::Result<()> {
    loop {
        let answer = prompt("Course to clear, # of an additional meal to remove, or enter to confirm:")?;
        if answer.is_empty() {
            return Ok(());
        }
        match edit(cart, &answer) {
            Ok(()) => render_cart(cart),
            Err(msg) => println!("{msg}"),
        }
    }
}

async fn order(api: &Api, args: OrderArgs) -> anyhow::Result<()> {
    let meals = api.meals().await.context("failed to fetch meals")?;
    let mut cart = Cart::default();
    cart.on_change(|cart| println!("Total Price: ${:.2}", cart.total()));

    for (course, choice) in Course::ALL.into_iter().zip([args.breakfast, args.lunch, args.dinner]) {
        if let Some(name) = choice {
            let meal = find(&meals, course.menu(), &name)?;
            cart.select(course, &meal.name, meal.price);
        }
    }
    for name in &args.additional {
        let meal = find(&meals, "additional", name)?;
        cart.add_additional(&meal.name, meal.price);
    }

    println!("Order summary:");
    render_cart(&cart);
    if !args.yes && !cart.is_empty() {
        review(&mut cart)?;
    }
    if cart.is_empty() {
        bail!("Please complete your meal selections before generating a receipt.");
    }

    let created = api
        .create_receipt(cart.total(), &cart.line_items())
        .await
        .context("Failed to confirm order. Please try again.")?;
    println!("Order confirmed! Receipt ID: {} at {}", created.receipt_number, created.timestamp);
    render_receipts(&api.receipts().await?);
    Ok(())
}

async fn update(api: &Api, receipt_number: &str, orders: Option<String>) -> anyhow::Result<()> {
    let raw = match orders {
        Some(raw) => raw,
        None => {
            let receipts = api.receipts().await?;
            let current = receipts
                .iter()
                .find(|r| r.receipt_id == receipt_number)
                .with_context(|| format!("receipt {receipt_number} not found"))?;
            println!("{}", serde_json::to_string(&current.orders)?);
            prompt("Enter updated orders as JSON:")?
        }
    };
    if raw.is_empty() {
        return Ok(());
    }
    let orders: Value = serde_json::from_str(&raw).context("Invalid JSON format. Please try again.")?;
    let message = api
        .update_orders(receipt_number, &orders)
        .await
        .context("Failed to update orders.")?;
    println!("{message}");
    render_receipts(&api.receipts().await?);
    Ok(())
}

async fn delete(api: &Api, receipt_number: &str, yes: bool) -> anyhow::Result<()> {
    if !yes {
        let answer = prompt(&format!("Are you sure you want to delete receipt {receipt_number}? [y/N]"))?;
        if !answer.eq_ignore_ascii_case("y") {
            return Ok(());
        }
    }
    let message = api
        .delete_receipt(receipt_number)
        .await
        .context("Failed to delete receipt.")?;
    println!("{message}");
    render_receipts(&api.receipts().await?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let api = Api::new(&args.host);

    match args.command {
        Commands::Menu => {
            let meals = api.meals().await.context("failed to fetch meals")?;
            for menu in ["breakfast", "lunch", "dinner", "additional"] {
                println!("{}:", menu);
                for meal in meals.iter().filter(|m| m.category == menu) {
                    println!("  [{}] {} - ${:.2}", meal.id, meal.name, meal.price);
                }
            }
        }
        Commands::Meal(meal) => match meal.command {
            MealCmds::Add { name, category, price } => {
                let id = api.add_meal(&name, &category, price).await?;
                println!("meal {} added with id = {}", name, id);
            }
            MealCmds::Remove { id } => {
                let deleted = api.delete_meal(id).await?;
                println!("removed {} meal(s) with id = {}", deleted, id);
            }
        },
        Commands::Order(args) => order(&api, args).await?,
        Commands::Receipts(receipts) => match receipts.command {
            ReceiptCmds::List => render_receipts(&api.receipts().await?),
            ReceiptCmds::Update { receipt_number, orders } => update(&api, &receipt_number, orders).await?,
            ReceiptCmds::Delete { receipt_number, yes } => delete(&api, &receipt_number, yes).await?,
        },
    };
    Ok(())
}
