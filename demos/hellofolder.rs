//! Builds a small feature tree through the factory, reads it back, then walks it.

kmlwalk::prelude! {}

pub fn run(ctx: &mut Ctx) -> Res<idx::Elem> {
    println!("Create a Folder with some Features...");
    let kml = ctx.create_kml();
    let folder = ctx.create_folder();
    ctx[folder].set_id("root-folder");
    ctx.set_feature(kml, folder)?;

    let placemark = ctx.create_placemark();
    ctx[placemark].set_id("pm1");
    ctx.add_feature(folder, placemark)
        .context(|| "adding placemark to the root folder")?;

    let sub = ctx.create_folder();
    ctx[sub].set_id("sub");
    ctx.add_feature(folder, sub)?;
    let nested = ctx.create_placemark();
    ctx.add_feature(sub, nested)?;

    // attaching twice is refused
    if let Err(err) = ctx.add_feature(sub, placemark) {
        println!("expected failure: {}", err.to_string().replace('\n', ", "));
    }

    let container = ctx
        .as_container(folder)
        .ok_or_else(|| error!(@capability("container") ctx[folder].desc()))?;
    for i in 0..container.feature_array_size() {
        if let Some(feature) = container.feature_array_at(i) {
            println!("feature Type: {}", feature.typ());
        }
    }

    ctx.set_root(kml);
    Ok(kml)
}

fn main() {
    simple_logger::SimpleLogger::new()
        .env()
        .without_timestamps()
        .init()
        .expect("failed to init logger /(-_-)\\");
    let mut ctx = Ctx::new();
    let root = run(&mut ctx).unwrap_or_else(|err| {
        println!("an error occurred:");
        for line in err.to_string().lines() {
            println!("- {}", line)
        }
        panic!("run failed")
    });

    println!("\nwalking the tree:");
    let outcome = walk::walk_document(&mut std::io::stdout(), &ctx, Some(root))
        .expect("failed to write to stdout");
    println!("|==| {:?}", outcome)
}
