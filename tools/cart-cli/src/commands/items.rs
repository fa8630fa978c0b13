//! Commands that change the cart.

use anyhow::Result;
use cart_core::{CartItem, ItemKind};

use super::{AddArgs, ClearArgs, RemoveArgs};
use crate::context::Context;

/// Run the add command.
pub fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.open_cart()?;

    let mut item = CartItem::new(ItemKind::new(&args.kind), args.product);
    for (name, value) in args.options {
        item = item.with_option(name, value);
    }
    for (name, value) in args.attributes {
        item = item.with_attribute(name, value);
    }
    let unique_id = item.unique_id();

    cart.add(item, args.qty, !args.dry_run)?;

    ctx.output.success(&format!("{} set to {}", unique_id, args.qty));
    ctx.output.json(&serde_json::json!({
        "unique_id": unique_id,
        "quantity": args.qty,
        "saved": !args.dry_run,
    }));
    Ok(())
}

/// Run the remove command.
pub fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.open_cart()?;
    cart.remove(&args.unique_id, args.qty, !args.dry_run)?;

    let remaining = cart.get(&args.unique_id).map_or(0, |item| item.quantity);
    if remaining == 0 {
        ctx.output.success(&format!("{} removed", args.unique_id));
    } else {
        ctx.output.success(&format!("{} reduced to {}", args.unique_id, remaining));
    }
    ctx.output.json(&serde_json::json!({
        "unique_id": args.unique_id,
        "quantity": remaining,
        "saved": !args.dry_run,
    }));
    Ok(())
}

/// Run the clear command.
pub fn clear(args: ClearArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.open_cart()?;
    let lines = cart.count(None);
    cart.clear(!args.dry_run)?;

    ctx.output.success(&format!("Cleared {} line(s)", lines));
    ctx.output.json(&serde_json::json!({
        "cleared": lines,
        "saved": !args.dry_run,
    }));
    Ok(())
}
