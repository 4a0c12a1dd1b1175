use sentinel_core::access::Access;
use sentinel_core::connection::{ConnectionData, CreateCameraPayload};

use super::Output;
use crate::cli::CamerasCommand;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, out: Output, cmd: CamerasCommand) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;
    let connections = ctx.connections();

    match cmd {
        CamerasCommand::List => {
            let cameras = connections.list().await?;
            out.emit(&cameras, |cameras| {
                if cameras.is_empty() {
                    println!("No cameras registered");
                }
                for camera in cameras {
                    print_camera(camera);
                }
            })
        }
        CamerasCommand::Create {
            office,
            name,
            location,
            url,
        } => {
            let payload = CreateCameraPayload::new(office, name, location, url);
            let created = connections.create(&payload).await?;
            out.emit(&created, |c| println!("Created camera {} ({})", c.id, c.nombre_camara))
        }
        CamerasCommand::State { id, active } => {
            let updated = connections.update_state(id, active).await?;
            out.emit(&updated, print_camera)
        }
        CamerasCommand::Enable { id, enabled } => {
            let updated = connections.update_enabled(id, enabled).await?;
            out.emit(&updated, print_camera)
        }
        CamerasCommand::Control { camera_id, action } => {
            let resp = ctx.camera_control().send(&camera_id, action).await?;
            println!(
                "camera {}: {} ({})",
                resp.camera_id, resp.status, resp.action_processed
            );
            Ok(())
        }
    }
}

pub async fn offices(ctx: &AppContext, out: Output) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;
    let offices = ctx.offices().list().await?;
    out.emit(&offices, |offices| {
        for o in offices {
            println!(
                "{:>4}  {:<24} {}, {}  [{}]",
                o.id_oficina, o.nombre_oficina, o.direccion, o.ciudad, o.responsable
            );
        }
    })
}

fn print_camera(c: &ConnectionData) {
    let state = if c.is_active() { "active" } else { "inactive" };
    let enabled = if c.habilitada { "enabled" } else { "disabled" };
    println!(
        "{:>4}  {:<24} {:<16} {:<8} {:<8} {:?}  {}",
        c.id,
        c.nombre_camara,
        c.ubicacion,
        state,
        enabled,
        c.stream_mode(),
        c.rtsp_url
    );
}
