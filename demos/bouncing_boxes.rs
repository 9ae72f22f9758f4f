//! Boxes dropping onto a floor, run headless for a few seconds
//! with positions printed to the terminal.

use nanoframe::{
    physics::{BodyKey, PhysicsConfig},
    scene::{Lifecycle, Particle, Scene},
    DtPolicy, FrameInfo, Game, GameConfig, Presenter, Vec2,
};

const RUN_FRAMES: u64 = 180;

struct TextPresenter {
    boxes: Vec<BodyKey>,
}

impl Presenter for TextPresenter {
    fn present(&mut self, scene: &Scene, frame: &FrameInfo) {
        if frame.frame % 30 != 0 {
            return;
        }
        let sparks = scene.entities_of::<Particle>().count();
        print!(
            "frame {:>3} ({:>5.1} fps, {} contacts, {sparks} sparks):",
            frame.frame, frame.fps, frame.contacts
        );
        for key in &self.boxes {
            if let Some(body) = scene.bodies.get(*key) {
                print!(" ({:>6.1}, {:>6.1})", body.position.x, body.position.y);
            }
        }
        println!();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GameConfig::default().with_dt_policy(DtPolicy::Clamped { max: 1.0 / 20.0 });
    let mut game = Game::new(config).with_physics(PhysicsConfig::default().with_gravity(600.0));
    let defaults = game.physics.config.body_defaults();

    let mut boxes = Vec::new();
    game.start(|scene| {
        scene.add_body(
            defaults
                .with_position([0.0, 400.0])
                .with_size([640.0, 40.0])
                .static_body(),
        )?;
        for i in 0..4 {
            let x = 80.0 + 130.0 * i as f64;
            boxes.push(scene.add_body(
                defaults
                    .with_position([x, 50.0 * i as f64])
                    .with_size([40.0, 40.0])
                    .with_velocity([20.0 - 10.0 * i as f64, 0.0])
                    .with_restitution(0.6)
                    .with_friction(0.3),
            )?);
        }
        Ok(())
    })?;

    // report hard landings
    game.scene.add_update_fn(|ctx| {
        for contact in ctx.contacts.iter().filter(|c| c.impulse.normal > 50.0) {
            if let Some(body) = ctx.bodies.get(contact.bodies[1]) {
                let c = body.center();
                println!("impact at ({:.1}, {:.1})", c.x, c.y);
            }
        }
        Lifecycle::Keep
    });
    let mut frames = 0;
    game.scene.add_update_fn(move |ctx| {
        frames += 1;
        if frames >= RUN_FRAMES {
            ctx.request_stop();
        }
        Lifecycle::Keep
    });
    for i in 0..8 {
        let angle = i as f64 * std::f64::consts::TAU / 8.0;
        game.scene.add_entity(Particle::new(
            Vec2::new(320.0, 200.0),
            Vec2::new(angle.cos(), angle.sin()) * 100.0,
            1.5,
        ));
    }

    let mut presenter = TextPresenter { boxes };
    game.run(&mut presenter)?;
    println!("stopped after {} frames", game.frame());
    Ok(())
}
