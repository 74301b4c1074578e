use vizij_avatar_core::{
    expression::blink_gate, outputs::Visual, pose::target_pose, AudioEvent, Avatar, AvatarEvent,
    Config, JointWrite, LoadOutcome, Regime, Role, Skeleton,
};

const DT: f32 = 1.0 / 60.0;

fn humanoid() -> Skeleton {
    let mut s = Skeleton::new("humanoid");
    let hips = s.add_joint("hips", None).unwrap();
    let spine = s.add_joint("spine", Some(hips)).unwrap();
    let chest = s.add_joint("chest", Some(spine)).unwrap();
    let neck = s.add_joint("neck", Some(chest)).unwrap();
    s.add_joint("head", Some(neck)).unwrap();
    for side in ["left", "right"] {
        let sh = s.add_joint(format!("{side}Shoulder"), Some(chest)).unwrap();
        let ua = s.add_joint(format!("{side}UpperArm"), Some(sh)).unwrap();
        let la = s.add_joint(format!("{side}LowerArm"), Some(ua)).unwrap();
        s.add_joint(format!("{side}Hand"), Some(la)).unwrap();
    }
    s.add_channel("aa");
    s.add_channel("blink");
    s.add_channel("happy");
    s
}

fn bound_avatar(skeleton: Skeleton) -> Avatar {
    let mut a = Avatar::new(Config::default());
    let t = a.set_model(Some("humanoid.vrm")).unwrap();
    assert_eq!(a.complete_load(t, Ok(skeleton)), LoadOutcome::Bound);
    a
}

fn head_y(a: &Avatar) -> f32 {
    a.outputs()
        .visual
        .as_skeletal()
        .and_then(|v| v.joints.iter().find(|w| w.role == Role::Head))
        .map(|w| w.rotation.y)
        .unwrap()
}

fn mouth_weight(a: &Avatar) -> f32 {
    a.outputs()
        .visual
        .as_skeletal()
        .and_then(|v| v.expressions.iter().find(|w| w.name == "aa"))
        .map(|w| w.weight)
        .unwrap()
}

/// it should open the mouth and move the head within half a second of speaking starting at t=1
#[test]
fn speaking_flip_at_one_second() {
    let mut speaker = bound_avatar(humanoid());
    let mut idler = bound_avatar(humanoid());

    // One second of idle.
    for _ in 0..60 {
        speaker.update(DT);
        idler.update(DT);
    }
    assert!(speaker.state().mouth_openness < 1e-3);

    speaker.handle_audio_event(AudioEvent::Play);
    let mut max_mouth = 0.0f32;
    let mut max_head_gap = 0.0f32;
    for _ in 0..30 {
        speaker.update(DT);
        idler.update(DT);
        max_mouth = max_mouth.max(mouth_weight(&speaker));
        max_head_gap = max_head_gap.max((head_y(&speaker) - head_y(&idler)).abs());
    }
    assert!(max_mouth >= 0.15, "mouth peaked at {max_mouth}");
    assert!(max_head_gap > 0.01, "head y stayed on the idle path ({max_head_gap})");
}

/// it should never change a joint by more than rate × dt per frame across regime flips
#[test]
fn no_snapping_across_transitions() {
    let cfg = Config::default();
    let mut a = bound_avatar(humanoid());
    let mut prev: Option<Vec<JointWrite>> = None;
    for frame in 0..900 {
        a.set_speaking((frame / 90) % 2 == 1);
        let joints: Vec<_> = a.update(DT).visual.as_skeletal().unwrap().joints.clone();
        if let Some(prev) = &prev {
            for (p, c) in prev.iter().zip(&joints) {
                assert_eq!(p.role, c.role);
                let step = p.rotation.max_abs_diff(&c.rotation);
                assert!(step <= cfg.rates.speaking_hands * DT + 1e-6, "frame {frame} {}", c.role);
            }
        }
        prev = Some(joints);
    }
}

/// it should keep every expression weight within [0, 1]
#[test]
fn weights_stay_in_range() {
    let mut a = bound_avatar(humanoid());
    for frame in 0..1200 {
        a.set_speaking(frame % 300 < 150);
        let v = a.update(DT).visual.as_skeletal().unwrap();
        for w in &v.expressions {
            assert!((0.0..=1.0).contains(&w.weight), "{} = {}", w.name, w.weight);
        }
    }
}

/// it should bind a skeleton without hands and keep animating the rest
#[test]
fn missing_hands_do_not_fail() {
    let mut s = Skeleton::new("no-hands");
    s.add_joint("head", None).unwrap();
    s.add_joint("leftUpperArm", None).unwrap();
    let mut a = bound_avatar(s);
    a.set_speaking(true);
    let out = a.update(DT);
    let roles: Vec<_> = out
        .visual
        .as_skeletal()
        .unwrap()
        .joints
        .iter()
        .map(|w| w.role)
        .collect();
    assert_eq!(roles, vec![Role::Head, Role::LeftUpperArm]);
    assert!(out.visual.as_skeletal().unwrap().expressions.is_empty());
}

/// it should show the primitive avatar without an asset and still react to speaking
#[test]
fn no_asset_uses_primitive() {
    let mut a = Avatar::default();
    assert_eq!(a.set_model(None), None);

    let rest = a.config().primitive.mouth_rest_scale;
    let mut idle_max = 0.0f32;
    for _ in 0..60 {
        let v = *a.update(DT).visual.as_primitive().unwrap();
        idle_max = idle_max.max(v.mouth_scale_y);
    }
    assert!((idle_max - rest).abs() < 1e-4);

    a.set_speaking(true);
    let mut speaking_max = 0.0f32;
    for _ in 0..30 {
        let v = *a.update(DT).visual.as_primitive().unwrap();
        speaking_max = speaking_max.max(v.mouth_scale_y);
    }
    assert!(speaking_max >= rest + 0.15, "mouth peaked at {speaking_max}");
}

/// it should keep the primitive avatar while a load is pending
#[test]
fn pending_load_shows_primitive() {
    let mut a = Avatar::default();
    a.set_model(Some("slow.vrm"));
    assert!(matches!(a.update(DT).visual, Visual::Primitive(_)));
}

/// it should discard load A when load B was requested before A resolved
#[test]
fn last_request_wins() {
    let mut a = Avatar::default();
    let ta = a.set_model(Some("a.vrm")).unwrap();
    let tb = a.set_model(Some("b.vrm")).unwrap();

    let mut sa = humanoid();
    sa.add_joint("only-in-a", None).unwrap();
    assert_eq!(a.complete_load(ta, Ok(sa)), LoadOutcome::Discarded);
    assert!(a.skeleton().is_none());
    assert!(!a.update(DT).visual.is_skeletal());

    assert_eq!(a.complete_load(tb, Ok(humanoid())), LoadOutcome::Bound);
    assert!(a.skeleton().unwrap().find_joint("only-in-a").is_none());
    let out = a.update(DT);
    assert!(out.visual.is_skeletal());
    let bound: Vec<_> = out
        .events
        .iter()
        .filter_map(|e| match e {
            AvatarEvent::SkeletonBound { url, .. } => Some(url.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(bound, vec!["b.vrm"]);
    assert!(!out
        .events
        .iter()
        .any(|e| matches!(e, AvatarEvent::LoadFailed { .. })));
}

/// it should dispose the previous skeleton when the URL changes
#[test]
fn changing_url_disposes_previous_model() {
    let mut a = bound_avatar(humanoid());
    a.update(DT);
    let t = a.set_model(Some("other.vrm")).unwrap();
    assert!(a.skeleton().is_none());
    let out = a.update(DT);
    assert!(out.visual.as_primitive().is_some());
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, AvatarEvent::ModelDisposed { url } if url == "humanoid.vrm")));
    assert_eq!(a.pending_load(), Some(t));
}

/// it should fall back when the bound asset turns out to be unbindable
#[test]
fn unbindable_asset_falls_back() {
    let mut s = Skeleton::new("lamp");
    s.add_joint("root", None).unwrap();
    let mut a = Avatar::default();
    let t = a.set_model(Some("lamp.glb")).unwrap();
    assert_eq!(a.complete_load(t, Ok(s)), LoadOutcome::Failed);
    assert!(a.update(DT).visual.as_primitive().is_some());
}

/// it should gate blinks exactly on sin(0.5 t) > 0.95 across several periods
#[test]
fn blink_gate_over_periods() {
    let cfg = Config::default();
    let threshold = cfg.expression.blink_threshold as f64;
    let mut transitions = 0;
    let mut last = 0.0;
    for i in 0..6000 {
        let t = i as f64 / 60.0;
        let g = blink_gate(t, &cfg.expression);
        let expected = if (t * 0.5).sin() > threshold { 1.0 } else { 0.0 };
        assert_eq!(g, expected);
        if g != last {
            transitions += 1;
            last = g;
        }
    }
    // 100 s covers ~8 periods of 4π s, each with one open/close pair.
    assert!(transitions >= 14, "only {transitions} blink edges");
}

/// it should keep idle targets inside the idle sway bound for all sampled times
#[test]
fn idle_pose_stays_small() {
    for i in 0..5000 {
        let t = i as f64 * 0.07;
        let pose = target_pose(t, Regime::Idle, 1.2);
        for (role, rot) in pose.iter() {
            let rest_z = match role {
                Role::LeftUpperArm => 1.2,
                Role::RightUpperArm => -1.2,
                _ => 0.0,
            };
            assert!(rot.x.abs() <= 0.05 + 1e-6);
            assert!(rot.y.abs() <= 0.05 + 1e-6);
            assert!((rot.z - rest_z).abs() <= 0.05 + 1e-6);
        }
    }
}
