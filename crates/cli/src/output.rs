//! Terminal output. Results go to stdout, failures to stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use lampshop_core::{AttributeDefinition, AttributeValues, Order, Product};

pub fn line(text: &str) {
    println!("{text}");
}

pub fn error(err: &dyn std::error::Error) {
    eprintln!("error: {err}");
}

pub fn definitions(definitions: &[AttributeDefinition]) {
    if definitions.is_empty() {
        println!("(no attributes)");
    }
    for def in definitions {
        println!("{:<20} {:<8} {}", def.key, def.kind.to_string(), def.label);
    }
}

pub fn product_row(product: &Product, category: &str) {
    println!(
        "{:>6}  {:<14} {:<30} {:<16} {:>10.2} {:>6}{}",
        product.id.to_string(),
        product.sku,
        product.name,
        category,
        product.price,
        product.stock_qty,
        if product.is_active { "" } else { "  (inactive)" }
    );
}

pub fn product(product: &Product) {
    println!("id:          {}", product.id);
    println!("sku:         {}", product.sku);
    println!("name:        {}", product.name);
    println!("description: {}", product.description);
    println!("category:    {}", product.category_id);
    println!("price:       {:.2}", product.price);
    println!("stock:       {}", product.stock_qty);
    println!("image:       {}", product.image_url);
    println!("active:      {}", product.is_active);
    attributes(&product.attributes);
}

pub fn attributes(values: &AttributeValues) {
    if values.is_empty() {
        return;
    }
    println!("attributes:");
    for (key, value) in values.iter() {
        println!("  {key}: {value}");
    }
}

pub fn order_row(order: &Order) {
    let units = total_units(order);
    println!(
        "{:>6}  {:<24} {:>4} items {:>10.2}  {}",
        order.id.to_string(), order.customer_name, units, order.total_price, order.status
    );
}

fn total_units(order: &Order) -> u64 {
    order.items.iter().map(|i| u64::from(i.quantity)).sum()
}
