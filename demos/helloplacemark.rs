//! Creates a placemark and plays with its `id`, `<name>` and `<visibility>` fields.

kmlwalk::prelude! {}

pub fn run(ctx: &mut Ctx) -> Res<()> {
    println!("Creating a Placemark...");
    let idx = ctx.create_placemark();
    let placemark = &mut ctx[idx];
    println!("placemark.typ(): {}", placemark.typ());

    println!("has_xxx() all return false...");
    println!("placemark.has_id(): {}", placemark.has_id());
    println!("placemark.has_name(): {}", placemark.has_name());
    println!("placemark.has_visibility(): {}", placemark.has_visibility());

    println!("Set some fields...");
    placemark.set_id("pm123");
    placemark.set_name("hi");
    // true by default
    placemark.set_visibility(false);

    println!("has_xxx() now return true...");
    println!("placemark.has_id(): {}", placemark.has_id());
    println!("placemark.has_name(): {}", placemark.has_name());
    println!("placemark.has_visibility(): {}", placemark.has_visibility());

    println!("Get some fields...");
    println!("placemark.id(): {}", placemark.id());
    println!("placemark.name(): {}", placemark.name());
    println!("placemark.visibility(): {}", placemark.visibility());

    println!("Clear fields...");
    placemark.clear_id();
    placemark.clear_name();
    placemark.clear_visibility();
    println!("placemark.has_id(): {}", placemark.has_id());
    println!("placemark.has_name(): {}", placemark.has_name());
    println!("placemark.has_visibility(): {}", placemark.has_visibility());

    println!("visibility is true by default...");
    println!("placemark.visibility(): {}", placemark.visibility());

    let feature = ctx
        .as_feature(idx)
        .ok_or_else(|| error!(@capability("feature") ctx[idx].desc()))?;
    println!("\nwalking the placemark:");
    walk::visit_feature(&mut std::io::stdout(), feature, 0)?;
    Ok(())
}

fn main() {
    simple_logger::SimpleLogger::new()
        .env()
        .without_timestamps()
        .init()
        .expect("failed to init logger /(-_-)\\");
    let mut ctx = Ctx::new();
    run(&mut ctx).unwrap_or_else(|err| {
        println!("an error occurred:");
        for line in err.to_string().lines() {
            println!("- {}", line)
        }
        panic!("run failed")
    });
}
