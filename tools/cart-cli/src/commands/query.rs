//! Read-only cart commands.

use anyhow::Result;
use cart_core::ItemKind;

use super::{KindFilter, TotalArgs};
use crate::context::Context;
use crate::output::format_attributes;

fn kind_of(filter: &KindFilter) -> Option<ItemKind> {
    filter.kind.as_deref().map(ItemKind::new)
}

/// Run the list command.
pub fn list(filter: KindFilter, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    let kind = kind_of(&filter);
    let items = cart.items(kind.as_ref());

    if ctx.output.is_json() {
        ctx.output.json(&items);
        return Ok(());
    }

    ctx.output.header(&format!("Cart for session {}", cart.context().session_id));
    if items.is_empty() {
        ctx.output.info("The cart is empty.");
        return Ok(());
    }

    let ids: Vec<String> = items.iter().map(|item| item.unique_id()).collect();
    let width = ids.iter().map(String::len).max().unwrap_or(0);
    for (item, id) in items.iter().zip(&ids) {
        ctx.output.table_row(
            &[
                id.as_str(),
                &format!("x{}", item.quantity),
                &format_attributes(&item.attributes),
            ],
            &[width, 6, 0],
        );
    }
    Ok(())
}

/// Run the count command.
pub fn count(filter: KindFilter, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    let kind = kind_of(&filter);
    let count = cart.count(kind.as_ref());

    ctx.output.kv("lines", &count.to_string());
    ctx.output.json(&serde_json::json!({ "count": count }));
    Ok(())
}

/// Run the total command.
pub fn total(args: TotalArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    let kind = kind_of(&args.filter);
    let total = cart.attribute_total(&args.attribute, kind.as_ref())?;

    ctx.output.kv(&args.attribute, &total.to_string());
    ctx.output.json(&serde_json::json!({
        "attribute": args.attribute,
        "total": total,
    }));
    Ok(())
}
