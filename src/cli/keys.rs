//! CLI credential and profile commands.

use anyhow::Result;

use aiforge::inference::credentials::CredentialSlot;
use aiforge::projects::Profile;

use super::Context;

pub fn list(ctx: &Context) -> Result<()> {
    let credentials = ctx.store.credentials();
    for slot in CredentialSlot::ALL {
        let state = if credentials.get(slot).is_some() {
            "set"
        } else {
            "-"
        };
        println!("{:<8}  {:<16}  {state}", slot.as_str(), slot.storage_key());
    }
    if credentials.is_empty() {
        println!();
        println!("No keys configured: chat replies are simulated.");
    }
    Ok(())
}

pub fn set(ctx: &Context, slot: CredentialSlot, value: &str) -> Result<()> {
    ctx.store.set_credential(slot, value);
    if value.trim().is_empty() {
        println!("Cleared {slot} key");
    } else {
        println!("Stored {slot} key");
    }
    Ok(())
}

pub fn profile(ctx: &Context, email: Option<String>, name: Option<String>) -> Result<()> {
    let current = ctx.store.profile();
    if email.is_none() && name.is_none() {
        println!("Email:  {}", current.email);
        println!("Name:   {}", current.name);
        return Ok(());
    }
    let next = Profile {
        email: email.map(|e| e.trim().to_string()).unwrap_or(current.email),
        name: name.unwrap_or(current.name),
    };
    ctx.store.set_profile(&next);
    println!("Profile saved");
    Ok(())
}
