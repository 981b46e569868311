use std::env;
use std::io::BufRead;
use std::path::Path;

use anyhow::Context;
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use catalogdb_core::config::{resolve_with_base, Config};
use catalogdb_core::fixtures;
use catalogdb_core::traits::{ItemRepository, ItemSearch};
use catalogdb_core::types::{Item, PageRequest, SortDirection, SortField};
use catalogdb_index::ItemIndex;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!(
            "Usage: {} <create-index|drop-index|seed|import|search|range|brands|all> [args...]",
            prog
        );
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn take_flag_value(args: &mut Vec<String>, name: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == name)?;
    if pos + 1 >= args.len() {
        eprintln!("{name} requires a value");
        std::process::exit(1);
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

fn take_switch(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

fn parse_sort(raw: &str) -> anyhow::Result<(SortField, SortDirection)> {
    let (field, dir) = raw.split_once(':').unwrap_or((raw, "asc"));
    let field = match field {
        "price" => SortField::Price,
        "brand" => SortField::Brand,
        "category" => SortField::Category,
        other => anyhow::bail!("unknown sort field: {other}"),
    };
    let dir = match dir {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => anyhow::bail!("unknown sort direction: {other}"),
    };
    Ok((field, dir))
}

fn print_item(item: &Item) {
    println!(
        "#{:<4} {:<16} brand={:<8} category={:<6} price={:.2} images={}",
        item.id, item.title, item.brand, item.category, item.price, item.images
    );
}

fn open_store(index_dir: &Path, config: &Config) -> anyhow::Result<ItemIndex> {
    Ok(ItemIndex::open(index_dir)?.with_writer_heap(config.index.writer_heap_bytes))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let cwd = env::current_dir()?;
    let index_dir = resolve_with_base(&cwd, &config.index.dir);

    let (cmd, mut args) = parse_args();
    match cmd.as_str() {
        "create-index" => {
            ItemIndex::create(&index_dir)?;
            println!("Created index at {}", index_dir.display());
        }
        "drop-index" => {
            ItemIndex::drop_index(&index_dir)?;
            println!("Dropped index at {}", index_dir.display());
        }
        "seed" => {
            let store = open_store(&index_dir, &config)?;
            let items = fixtures::reference_catalog();
            store.save_all(&items)?;
            println!("Seeded {} items", items.len());
        }
        "import" => {
            let path = args
                .first()
                .context("Usage: catalogdb-cli import <items.jsonl>")?;
            let file = std::fs::File::open(path).with_context(|| format!("open {path}"))?;
            let mut items = Vec::new();
            for line in std::io::BufReader::new(file).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let item: Item = serde_json::from_str(&line)
                    .with_context(|| format!("bad item record: {line}"))?;
                items.push(item);
            }
            let store = open_store(&index_dir, &config)?;
            let bar = ProgressBar::new(items.len() as u64);
            for chunk in items.chunks(500) {
                store.save_all(chunk)?;
                bar.inc(chunk.len() as u64);
            }
            bar.finish();
            println!("Imported {} items", items.len());
        }
        "search" => {
            let sort = take_flag_value(&mut args, "--sort");
            let page = take_flag_value(&mut args, "--page");
            let size = take_flag_value(&mut args, "--size");
            let phrase = args
                .first()
                .context("Usage: catalogdb-cli search \"<phrase>\" [--page N] [--size N] [--sort field:dir]")?;
            let size = match size {
                Some(s) => s.parse::<usize>().context("--size must be a number")?,
                None => config.search.default_limit,
            }
            .min(config.search.max_limit);

            let store = open_store(&index_dir, &config)?;
            if let Some(page) = page {
                let page = page.parse::<usize>().context("--page must be a number")?;
                let result = store.match_title_page(phrase, PageRequest::of(page, size))?;
                println!("Total hits: {}", result.total);
                for item in &result.items {
                    print_item(item);
                }
            } else if let Some(sort) = sort {
                let (field, direction) = parse_sort(&sort)?;
                for item in store.match_title_sorted(phrase, field, direction, size)? {
                    print_item(&item);
                }
            } else {
                for scored in store.match_title(phrase, size)? {
                    print!("{:>8.4}  ", scored.score);
                    print_item(&scored.item);
                }
            }
        }
        "range" => {
            let low = args
                .first()
                .context("Usage: catalogdb-cli range <low> <high>")?
                .parse::<f64>()
                .context("low bound must be a number")?;
            let high = args
                .get(1)
                .context("Usage: catalogdb-cli range <low> <high>")?
                .parse::<f64>()
                .context("high bound must be a number")?;
            let store = open_store(&index_dir, &config)?;
            for item in store.find_by_price_between(low, high)? {
                print_item(&item);
            }
        }
        "brands" => {
            let with_avg = take_switch(&mut args, "--avg");
            let store = open_store(&index_dir, &config)?;
            let buckets = if with_avg {
                store.brand_buckets_with_avg_price()?
            } else {
                store.brand_buckets()?
            };
            for bucket in buckets {
                match bucket.avg_price {
                    Some(avg) => println!("{}\t{}\tavg_price={:.2}", bucket.brand, bucket.count, avg),
                    None => println!("{}\t{}", bucket.brand, bucket.count),
                }
            }
        }
        "all" => {
            let store = open_store(&index_dir, &config)?;
            for item in store.find_all()? {
                print_item(&item);
            }
        }
        _ => {
            eprintln!("Unknown command: {cmd}");
            std::process::exit(1);
        }
    }
    Ok(())
}
