use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::render::mesh::morph::MorphWeights;
use bevy::scene::SceneInstance;

use crate::components::{
    AvatarController, AvatarModel, BoundEntities, FallbackPart, ModelReady, MorphTargetNames,
    VizijAvatar,
};
use crate::resources::{AvatarSettings, AvatarTimestep};
use crate::{AvatarAudioEvent, AvatarOutputEvent};
use vizij_avatar_core::{Avatar, AvatarEvent, Euler, JointId, LoadOutcome, Skeleton, Visual};

// Fallback figure layout, in the avatar's local space.
const HEAD_RADIUS: f32 = 0.8;
const EYE_RADIUS: f32 = 0.1;
const EYE_OFFSET: Vec3 = Vec3::new(0.25, 0.2, 0.72);
const MOUTH_OFFSET: Vec3 = Vec3::new(0.0, -0.2, 0.76);
const MOUTH_SIZE: Vec3 = Vec3::new(0.3, 0.1, 0.05);

/// Insert an [`AvatarController`] for every new [`VizijAvatar`] and spawn its
/// fallback figure. Meshes are only attached when the render assets exist.
pub fn attach_avatar_system(
    mut commands: Commands,
    added: Query<Entity, (Added<VizijAvatar>, Without<AvatarController>)>,
    settings: Res<AvatarSettings>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    for avatar in added.iter() {
        let mut ctrl = AvatarController::new(Avatar::new(settings.0.clone()));

        let root = commands
            .spawn((
                SpatialBundle::default(),
                FallbackPart::Body,
                Name::new("avatar-fallback"),
            ))
            .id();
        let left = Transform::from_translation(EYE_OFFSET * Vec3::new(-1.0, 1.0, 1.0));
        let right = Transform::from_translation(EYE_OFFSET);
        let mouth = Transform::from_translation(MOUTH_OFFSET)
            .with_scale(Vec3::new(1.0, settings.0.primitive.mouth_rest_scale, 1.0));
        let parts = [
            (FallbackPart::LeftEye, left),
            (FallbackPart::RightEye, right),
            (FallbackPart::Mouth, mouth),
        ];

        match (meshes.as_deref_mut(), materials.as_deref_mut()) {
            (Some(meshes), Some(materials)) => {
                let skin = materials.add(Color::srgb(1.0, 0.85, 0.7));
                let dark = materials.add(Color::srgb(0.1, 0.1, 0.1));
                commands.entity(root).insert((
                    meshes.add(Sphere::new(HEAD_RADIUS)),
                    skin,
                ));
                let eye = meshes.add(Sphere::new(EYE_RADIUS));
                let mouth_mesh = meshes.add(Cuboid::new(MOUTH_SIZE.x, MOUTH_SIZE.y, MOUTH_SIZE.z));
                for (part, transform) in parts {
                    let mesh = if part == FallbackPart::Mouth {
                        mouth_mesh.clone()
                    } else {
                        eye.clone()
                    };
                    let child = commands
                        .spawn((
                            PbrBundle {
                                mesh,
                                material: dark.clone(),
                                transform,
                                ..default()
                            },
                            part,
                        ))
                        .id();
                    commands.entity(root).add_child(child);
                }
            }
            _ => {
                for (part, transform) in parts {
                    let child = commands
                        .spawn((SpatialBundle::from_transform(transform), part))
                        .id();
                    commands.entity(root).add_child(child);
                }
            }
        }

        commands.entity(avatar).add_child(root);
        ctrl.fallback_root = Some(root);
        commands.entity(avatar).insert(ctrl);
    }
}

/// Map audio lifecycle events onto the speaking flag.
pub fn audio_event_system(
    mut events: EventReader<AvatarAudioEvent>,
    mut avatars: Query<&mut VizijAvatar>,
) {
    for ev in events.read() {
        if let Ok(mut avatar) = avatars.get_mut(ev.avatar) {
            let speaking = ev.event.speaking();
            if avatar.speaking != speaking {
                avatar.speaking = speaking;
            }
        }
    }
}

/// Forward model changes to the core. A new URL despawns the previous scene
/// (bound or still loading) and spawns a fresh one for the new request.
pub fn request_model_system(
    mut commands: Commands,
    mut avatars: Query<(Entity, &VizijAvatar, &mut AvatarController), Changed<VizijAvatar>>,
    asset_server: Option<Res<AssetServer>>,
) {
    for (entity, avatar, mut ctrl) in avatars.iter_mut() {
        let requested = avatar.model.as_deref().filter(|m| !m.is_empty());
        if requested == ctrl.core.model_url() {
            continue;
        }

        let ticket = ctrl.core.set_model(requested);
        ctrl.bound = None;
        if let Some(old) = ctrl.model_entity.take() {
            commands.entity(old).despawn_recursive();
        }

        let (Some(ticket), Some(url)) = (ticket, requested) else {
            continue;
        };
        let model = AvatarModel {
            avatar: entity,
            ticket,
            url: url.to_string(),
        };
        let id = match asset_server.as_deref() {
            Some(server) => {
                let scene: Handle<Scene> = server.load(GltfAssetLabel::Scene(0).from_asset(url.to_string()));
                commands
                    .spawn((
                        SceneBundle {
                            scene,
                            visibility: Visibility::Hidden,
                            ..default()
                        },
                        model,
                    ))
                    .id()
            }
            None => commands
                .spawn((
                    SpatialBundle {
                        visibility: Visibility::Hidden,
                        ..default()
                    },
                    model,
                ))
                .id(),
        };
        commands.entity(entity).add_child(id);
        ctrl.model_entity = Some(id);
        debug!("vizij avatar: requested model '{url}' ({ticket:?})");
    }
}

/// Copy the speaking flag into the core.
pub fn sync_speaking_system(mut avatars: Query<(&VizijAvatar, &mut AvatarController)>) {
    for (avatar, mut ctrl) in avatars.iter_mut() {
        if ctrl.core.state().speaking != avatar.speaking {
            ctrl.core.set_speaking(avatar.speaking);
        }
    }
}

/// Report failed scene loads to the core and log progress while loading.
pub fn poll_model_load_system(
    mut commands: Commands,
    models: Query<(Entity, &AvatarModel, &Handle<Scene>), Without<ModelReady>>,
    mut avatars: Query<&mut AvatarController>,
    asset_server: Option<Res<AssetServer>>,
) {
    let Some(server) = asset_server else {
        return;
    };
    for (entity, model, handle) in models.iter() {
        match server.get_load_state(handle.id()) {
            Some(LoadState::Failed(err)) => {
                warn!("vizij avatar: failed to load '{}': {err}", model.url);
                if let Ok(mut ctrl) = avatars.get_mut(model.avatar) {
                    ctrl.core.fail_load(model.ticket, &err);
                    if ctrl.model_entity == Some(entity) {
                        ctrl.model_entity = None;
                    }
                }
                commands.entity(entity).despawn_recursive();
            }
            Some(LoadState::Loading) => {
                debug!("vizij avatar: loading '{}'", model.url);
            }
            _ => {}
        }
    }
}

/// Mark model scenes whose instance has finished spawning.
pub fn mark_model_ready_system(
    mut commands: Commands,
    models: Query<(Entity, &SceneInstance), (With<AvatarModel>, Without<ModelReady>)>,
    scene_spawner: Option<Res<SceneSpawner>>,
) {
    let Some(spawner) = scene_spawner else {
        return;
    };
    for (entity, instance) in models.iter() {
        if spawner.instance_is_ready(**instance) {
            commands.entity(entity).insert(ModelReady);
        }
    }
}

/// Build a core skeleton from the named descendants of each ready model,
/// hand it to the core and record which entities back each joint/channel.
#[allow(clippy::too_many_arguments)]
pub fn bind_model_system(
    mut commands: Commands,
    ready: Query<(Entity, &AvatarModel), Added<ModelReady>>,
    mut avatars: Query<&mut AvatarController>,
    children: Query<&Children>,
    names: Query<&Name>,
    transforms: Query<&Transform>,
    morphs: Query<(&MorphWeights, Option<&MorphTargetNames>)>,
    meshes: Option<Res<Assets<Mesh>>>,
) {
    for (model_entity, model) in ready.iter() {
        let Ok(mut ctrl) = avatars.get_mut(model.avatar) else {
            continue;
        };

        let mut skeleton = Skeleton::new(model.url.clone());
        let mut bound = BoundEntities::default();
        walk_scene(
            model_entity,
            None,
            &mut skeleton,
            &mut bound,
            &children,
            &names,
            &transforms,
            &morphs,
            meshes.as_deref(),
        );

        match ctrl.core.complete_load(model.ticket, Ok(skeleton)) {
            LoadOutcome::Bound => {
                info!(
                    "vizij avatar: bound '{}' ({} joints, {} channels)",
                    model.url,
                    bound.joints.len(),
                    bound.channels.len()
                );
                ctrl.bound = Some(bound);
            }
            LoadOutcome::Discarded => {
                // Superseded while the scene was spawning; the request system
                // already despawned or replaced it.
                if ctrl.model_entity != Some(model_entity) {
                    commands.entity(model_entity).despawn_recursive();
                }
            }
            LoadOutcome::Failed => {
                if ctrl.model_entity == Some(model_entity) {
                    ctrl.model_entity = None;
                }
                commands.entity(model_entity).despawn_recursive();
            }
        }
    }
}

/// Depth-first walk: every uniquely named node becomes a joint parented to
/// its nearest named ancestor; every `MorphWeights` slot with a known target
/// name becomes an expression channel.
#[allow(clippy::too_many_arguments)]
fn walk_scene(
    entity: Entity,
    parent: Option<JointId>,
    skeleton: &mut Skeleton,
    bound: &mut BoundEntities,
    children: &Query<&Children>,
    names: &Query<&Name>,
    transforms: &Query<&Transform>,
    morphs: &Query<(&MorphWeights, Option<&MorphTargetNames>)>,
    meshes: Option<&Assets<Mesh>>,
) {
    let mut this = parent;
    if let Ok(name) = names.get(entity) {
        if skeleton.find_joint(name.as_str()).is_none() {
            if let Ok(id) = skeleton.add_joint(name.as_str(), parent) {
                if let Ok(tf) = transforms.get(entity) {
                    let (x, y, z) = tf.rotation.to_euler(EulerRot::XYZ);
                    skeleton.set_rotation(id, Euler::new(x, y, z));
                }
                bound.joints.push(entity);
                this = Some(id);
            }
        } else {
            debug!("vizij avatar: skipping duplicate node name '{}'", name.as_str());
        }
    }

    if let Ok((weights, target_names)) = morphs.get(entity) {
        let target_names: Vec<String> = match target_names {
            Some(n) => n.0.clone(),
            None => weights
                .first_mesh()
                .and_then(|h| meshes.and_then(|m| m.get(h)))
                .and_then(|mesh| mesh.morph_target_names())
                .map(|n| n.to_vec())
                .unwrap_or_default(),
        };
        let slots = weights.weights().len();
        for (i, target) in target_names.into_iter().take(slots).enumerate() {
            skeleton.add_channel(target);
            bound.channels.push((entity, i));
        }
    }

    if let Ok(cs) = children.get(entity) {
        for &c in cs.iter() {
            walk_scene(
                c, this, skeleton, bound, children, names, transforms, morphs, meshes,
            );
        }
    }
}

/// Advance every avatar one frame, forward its events and write the visual
/// to the scene.
#[allow(clippy::too_many_arguments)]
pub fn animate_avatar_system(
    time: Res<Time>,
    step: Res<AvatarTimestep>,
    mut avatars: Query<(Entity, &mut AvatarController)>,
    mut transforms: Query<&mut Transform>,
    mut visibility: Query<&mut Visibility>,
    mut morphs: Query<&mut MorphWeights>,
    parts: Query<(Entity, &FallbackPart, &Parent)>,
    mut out_events: EventWriter<AvatarOutputEvent>,
) {
    let dt = step.delta(&time);
    for (avatar, mut ctrl) in avatars.iter_mut() {
        let ctrl = &mut *ctrl;
        let outputs = ctrl.core.update(dt);
        for event in outputs.events.iter().cloned() {
            out_events.send(AvatarOutputEvent { avatar, event });
        }

        let show_model = outputs.visual.is_skeletal() && ctrl.bound.is_some();
        set_visible(&mut visibility, ctrl.model_entity, show_model);
        set_visible(&mut visibility, ctrl.fallback_root, !show_model);

        match &outputs.visual {
            Visual::Skeletal(v) => {
                let Some(bound) = &ctrl.bound else {
                    continue;
                };
                if let Some(root) = ctrl.model_entity {
                    if let Ok(mut tf) = transforms.get_mut(root) {
                        tf.rotation = Quat::from_rotation_y(v.root_yaw);
                    }
                }
                for w in &v.joints {
                    let Some(&e) = bound.joints.get(w.joint.index()) else {
                        continue;
                    };
                    if let Ok(mut tf) = transforms.get_mut(e) {
                        let r = w.rotation;
                        tf.rotation = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
                    }
                }
                for w in &v.expressions {
                    let Some(&(e, i)) = bound.channels.get(w.channel.index()) else {
                        continue;
                    };
                    if let Ok(mut m) = morphs.get_mut(e) {
                        if let Some(slot) = m.weights_mut().get_mut(i) {
                            *slot = w.weight;
                        }
                    }
                }
            }
            Visual::Primitive(v) => {
                let Some(root) = ctrl.fallback_root else {
                    continue;
                };
                if let Ok(mut tf) = transforms.get_mut(root) {
                    tf.translation.y = v.bob_offset_y;
                    tf.rotation = Quat::from_rotation_y(v.yaw);
                }
                for (e, part, parent) in parts.iter() {
                    if parent.get() != root {
                        continue;
                    }
                    let scale_y = match part {
                        FallbackPart::LeftEye => v.left_eye_scale_y,
                        FallbackPart::RightEye => v.right_eye_scale_y,
                        FallbackPart::Mouth => v.mouth_scale_y,
                        FallbackPart::Body => continue,
                    };
                    if let Ok(mut tf) = transforms.get_mut(e) {
                        tf.scale.y = scale_y;
                    }
                }
            }
        }
    }
}

fn set_visible(q: &mut Query<&mut Visibility>, entity: Option<Entity>, visible: bool) {
    let Some(e) = entity else {
        return;
    };
    if let Ok(mut v) = q.get_mut(e) {
        let want = if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *v != want {
            *v = want;
        }
    }
}

/// Tear down avatars whose [`VizijAvatar`] was removed: cancel loads,
/// dispose the skeleton and despawn the plugin-owned children.
pub fn unmount_avatar_system(
    mut commands: Commands,
    mut removed: RemovedComponents<VizijAvatar>,
    mut avatars: Query<&mut AvatarController>,
    mut out_events: EventWriter<AvatarOutputEvent>,
) {
    for avatar in removed.read() {
        let Ok(mut ctrl) = avatars.get_mut(avatar) else {
            continue;
        };
        for event in ctrl.core.unmount() {
            out_events.send(AvatarOutputEvent { avatar, event });
        }
        for e in [ctrl.model_entity.take(), ctrl.fallback_root.take()]
            .into_iter()
            .flatten()
        {
            commands.entity(e).despawn_recursive();
        }
        commands.entity(avatar).remove::<AvatarController>();
        info!("vizij avatar: unmounted {avatar:?}");
    }
}

/// Log the events the core raised; hosts read [`AvatarOutputEvent`] directly.
pub fn log_avatar_events_system(mut events: EventReader<AvatarOutputEvent>) {
    for ev in events.read() {
        match &ev.event {
            AvatarEvent::LoadFailed { url, reason } => {
                warn!("vizij avatar {:?}: '{url}' unusable: {reason}", ev.avatar)
            }
            other => debug!("vizij avatar {:?}: {other:?}", ev.avatar),
        }
    }
}
