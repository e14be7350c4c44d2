//! Fleetwright - port layout inspector
//!
//! Loads a saved canvas (or builds a small demo one), reflows every widget and
//! prints port positions and reroute summaries. Set `RUST_LOG=debug` to trace
//! route creation, group growth and evictions.

use egui::Pos2;
use fleetwright::{Canvas, EngineConfig, NodeResult, Widget, WidgetKind};
use std::path::Path;

fn demo_canvas(config: EngineConfig) -> NodeResult<Canvas> {
    let mut canvas = Canvas::new(config);
    let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::new(40.0, 40.0));
    let powerplant = canvas.add_widget(WidgetKind::Powerplants, Pos2::new(40.0, 300.0));
    let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::new(420.0, 160.0));
    let loadout = canvas.add_widget(WidgetKind::Loadouts, Pos2::new(800.0, 120.0));

    for source in [&missile, &powerplant] {
        let output = canvas
            .widget(source)
            .and_then(|w| w.core().ports().iter().find(|p| p.is_output()))
            .map(|p| p.id.clone());
        if let Some(output) = output {
            canvas.connect_to_widget(&output, &reroute)?;
        }
    }

    let weapon_route = canvas
        .widget(&reroute)
        .and_then(|w| w.core().ports().iter().find(|p| p.is_output() && p.port_type == "weapon"))
        .map(|p| p.id.clone());
    if let Some(route_out) = weapon_route {
        canvas.connect_to_widget(&route_out, &loadout)?;
    }
    Ok(canvas)
}

fn print_widget(canvas: &Canvas, widget: &dyn Widget) {
    let core = widget.core();
    println!(
        "{} [{}] {} at ({:.0}, {:.0}){}",
        core.title,
        core.kind,
        core.id,
        core.position.x,
        core.position.y,
        if core.minimized { " (minimized)" } else { "" }
    );
    for port in core.ports() {
        let position = canvas.port_canvas_position(&port.id).unwrap_or(port.position);
        println!(
            "  {:<6} {:<16} {:<14} ({:>7.1}, {:>7.1})  {} connection(s)",
            port.direction.as_str(),
            port.label,
            port.port_type,
            position.x,
            position.y,
            port.connection_count()
        );
    }
    if let Some(rows) = core.list(fleetwright::constants::routes::SECTION_ID) {
        for row in rows {
            if row.placeholder {
                println!("  - {}", row.name);
            } else {
                println!("  - {}: {}", row.name, row.details);
            }
        }
    }
}

fn main() {
    env_logger::init();

    let config = EngineConfig::load_or_default();
    let canvas = match std::env::args().nth(1) {
        Some(path) => Canvas::load_from_file(Path::new(&path), config),
        None => demo_canvas(config),
    };
    let canvas = match canvas {
        Ok(canvas) => canvas,
        Err(error) => {
            eprintln!("fleetwright: {}", error);
            std::process::exit(1);
        }
    };

    for widget in canvas.widgets() {
        print_widget(&canvas, widget);
    }
    println!("{} connection(s)", canvas.connections().len());
}
