use sentinel_core::access::Access;

use super::Output;
use crate::cli::UsersCommand;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, out: Output, cmd: UsersCommand) -> anyhow::Result<()> {
    ctx.require(Access::Admin)?;
    let auth = ctx.auth();

    match cmd {
        UsersCommand::List => {
            let users = auth.list_users().await?;
            out.emit(&users, |users| {
                for u in users {
                    println!(
                        "{:>4}  {:<28} {:<24} {:<7} {}",
                        u.id_usuario,
                        u.email,
                        format!("{} {}", u.nombre, u.apellido).trim(),
                        u.rol,
                        u.phone.as_deref().unwrap_or("-")
                    );
                }
            })
        }
        UsersCommand::Delete { id } => {
            auth.delete_user(id).await?;
            println!("Deleted user {id}");
            Ok(())
        }
    }
}
