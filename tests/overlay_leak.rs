use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use terrigraphic::effects::{
    Backdrop, EffectConfig, GeometricArt, MotionReel, ParticleField, SceneCycler,
};
use terrigraphic::overlay::{Effect, Overlay};
use terrigraphic::render::{
    Frame, HeadlessRenderer, Material, Renderer, ResourceHandle, ResourceKind,
};
use terrigraphic::{Error, Result};

/// Headless renderer whose geometry allocation can be made to fail.
#[derive(Default)]
struct FlakyRenderer {
    inner: HeadlessRenderer,
    fail_geometry: bool,
    calls_drawn: usize,
}

impl Renderer for FlakyRenderer {
    type Target = ();

    fn create_context(&mut self, target: &()) -> Result<ResourceHandle> {
        self.inner.create_context(target)
    }

    fn create_geometry(&mut self, context: ResourceHandle) -> Result<ResourceHandle> {
        if self.fail_geometry {
            return Err(Error::Render("out of memory".into()));
        }
        self.inner.create_geometry(context)
    }

    fn create_material(
        &mut self,
        context: ResourceHandle,
        material: &Material,
    ) -> Result<ResourceHandle> {
        self.inner.create_material(context, material)
    }

    fn draw(&mut self, context: ResourceHandle, frame: &Frame<'_>) -> Result<()> {
        self.calls_drawn = frame.calls.len();
        self.inner.draw(context, frame)
    }

    fn dispose(&mut self, handles: &[ResourceHandle]) {
        self.inner.dispose(handles);
    }
}

fn cycle<E: Effect>(effect: E, times: usize) {
    let renderer = HeadlessRenderer::shared();
    let mut overlay = Overlay::new(renderer.clone(), effect);
    let before = renderer.borrow().live_resources();
    for _ in 0..times {
        overlay.open(&()).unwrap();
        for _ in 0..3 {
            assert!(overlay.tick(Some(Vec2::new(0.1, -0.2))).unwrap());
        }
        overlay.close();
        assert_eq!(renderer.borrow().live_resources(), before);
    }
    assert_eq!(renderer.borrow().double_disposals(), 0);
}

#[test]
fn hundred_open_close_cycles_do_not_leak() {
    cycle(
        GeometricArt::with_rng(EffectConfig::default(), StdRng::seed_from_u64(1)),
        100,
    );
    cycle(
        MotionReel::new(SceneCycler::reel_with_rng(StdRng::seed_from_u64(2))),
        100,
    );
    cycle(Backdrop::with_rng(StdRng::seed_from_u64(3)), 100);
    cycle(ParticleField::with_rng(200, StdRng::seed_from_u64(4)), 100);
}

#[test]
fn regeneration_swaps_layer_resources() {
    let renderer = HeadlessRenderer::shared();
    let mut overlay = Overlay::new(
        renderer.clone(),
        GeometricArt::with_rng(EffectConfig::default(), StdRng::seed_from_u64(5)),
    );
    overlay.open(&()).unwrap();
    overlay.tick(None).unwrap();
    let open = renderer.borrow().live_resources();

    for count in [20, 40, 60, 80] {
        overlay.effect_mut().set_config(EffectConfig {
            count,
            ..EffectConfig::default()
        });
        overlay.tick(None).unwrap();
        assert_eq!(renderer.borrow().live_resources(), open);
    }
    overlay.close();
    assert_eq!(renderer.borrow().live_resources(), 0);
}

#[test]
fn scene_changes_release_previous_scene() {
    let renderer = HeadlessRenderer::shared();
    let mut overlay = Overlay::new(
        renderer.clone(),
        MotionReel::new(SceneCycler::reel_with_rng(StdRng::seed_from_u64(6))),
    );
    overlay.open(&()).unwrap();
    for _ in 0..12 {
        overlay.effect_mut().navigate(|c| c.next());
        overlay.tick(None).unwrap();
        let parts = overlay.effect().cycler().scene().parts().len();
        let r = renderer.borrow();
        assert_eq!(r.live_of(ResourceKind::Context), 1);
        assert_eq!(r.live_of(ResourceKind::Geometry), parts);
        assert_eq!(r.live_of(ResourceKind::Material), parts);
    }
    drop(overlay);
    assert_eq!(renderer.borrow().live_resources(), 0);
}

#[test]
fn closed_overlay_never_draws() {
    let renderer = HeadlessRenderer::shared();
    let mut overlay = Overlay::new(renderer.clone(), Backdrop::with_rng(StdRng::seed_from_u64(7)));
    assert!(!overlay.tick(None).unwrap());

    let gate = overlay.open(&()).unwrap();
    assert!(overlay.tick(None).unwrap());
    let drawn = renderer.borrow().frames_drawn();
    assert!(renderer.borrow().last_vertex_count() > 0);

    overlay.close();
    assert!(!gate.is_open());
    assert!(!overlay.tick(None).unwrap());
    assert_eq!(renderer.borrow().frames_drawn(), drawn);

    // Closing twice is harmless.
    overlay.close();
    assert_eq!(renderer.borrow().double_disposals(), 0);
}

#[test]
fn visibility_flag_drives_lifecycle() {
    let renderer = HeadlessRenderer::shared();
    let mut overlay = Overlay::new(renderer.clone(), ParticleField::with_rng(50, StdRng::seed_from_u64(8)));
    overlay.set_visible(true, &()).unwrap();
    overlay.set_visible(true, &()).unwrap();
    assert_eq!(renderer.borrow().live_of(ResourceKind::Context), 1);
    overlay.set_visible(false, &()).unwrap();
    assert_eq!(renderer.borrow().live_resources(), 0);
}

#[test]
fn failed_layer_swap_is_retried() {
    let renderer = Rc::new(RefCell::new(FlakyRenderer::default()));
    let mut overlay = Overlay::new(
        renderer.clone(),
        GeometricArt::with_rng(EffectConfig::default(), StdRng::seed_from_u64(9)),
    );
    overlay.open(&()).unwrap();
    assert!(overlay.tick(None).unwrap());
    assert_eq!(renderer.borrow().calls_drawn, 1);

    renderer.borrow_mut().fail_geometry = true;
    overlay.effect_mut().set_config(EffectConfig {
        count: 30,
        ..EffectConfig::default()
    });
    assert!(overlay.tick(None).is_err());
    {
        let r = renderer.borrow();
        assert_eq!(r.inner.live_of(ResourceKind::Context), 1);
        assert_eq!(r.inner.live_of(ResourceKind::Geometry), 0);
        assert_eq!(r.inner.live_of(ResourceKind::Material), 0);
    }
    // Still failing: every tick keeps trying and keeps reporting it.
    assert!(overlay.tick(None).is_err());

    renderer.borrow_mut().fail_geometry = false;
    assert!(overlay.tick(None).unwrap());
    {
        let r = renderer.borrow();
        assert_eq!(r.calls_drawn, 1);
        assert_eq!(r.inner.live_of(ResourceKind::Geometry), 1);
        let per_element = overlay.effect().elements()[0].shape.outline().len();
        assert_eq!(r.inner.last_vertex_count(), 30 * per_element);
    }

    overlay.close();
    assert_eq!(renderer.borrow().inner.live_resources(), 0);
    assert_eq!(renderer.borrow().inner.double_disposals(), 0);
}
