//! CLI sharing commands.

use anyhow::Result;

use aiforge::access::{resolve_access, surface_for, Surface};
use aiforge::projects::{GeneralAccess, InviteRole};

use super::{print_project_rows, Context};

pub fn link(ctx: &Context, id: &str, access: GeneralAccess) -> Result<()> {
    let mut project = ctx.project(id)?;
    project.set_general_access(access);
    ctx.store.update(&project);
    println!("Link access for {id} is now {access}");
    Ok(())
}

pub fn invite(ctx: &Context, id: &str, email: &str, role: InviteRole) -> Result<()> {
    let mut project = ctx.project(id)?;
    project.add_invite(email, role);
    ctx.store.update(&project);
    println!("Invited {} as {role}", email.trim());
    Ok(())
}

pub fn revoke(ctx: &Context, id: &str, email: &str) -> Result<()> {
    let mut project = ctx.project(id)?;
    if project.remove_invite(email) {
        ctx.store.update(&project);
        println!("Removed invite for {email}");
    } else {
        println!("No invite for {email}");
    }
    Ok(())
}

pub fn shared(ctx: &Context) -> Result<()> {
    print_project_rows(&ctx.store.list_shared_with(&ctx.identity));
    Ok(())
}

/// Report the role and surface the current identity gets for a project link.
pub fn open(ctx: &Context, id: &str) -> Result<()> {
    let Some(project) = ctx.store.get(id) else {
        println!("Not found");
        return Ok(());
    };
    let role = resolve_access(&project, &ctx.identity, ctx.config.access.email_matching);
    match surface_for(role) {
        Surface::Editor => println!("{}: editor", project.project_name),
        Surface::Viewer => {
            println!("{}: viewer", project.display_name);
            if project.viewer_config.show_description && !project.description.is_empty() {
                println!("{}", project.description);
            }
        }
        Surface::NotFound => println!("Not found"),
    }
    Ok(())
}
