use fcekit_mesh::{Mesh, MeshError, MeshValidity, Vector3, DIAMOND_VERTICES};

fn flat_diamond(mesh: &mut Mesh, name: &str, at: Vector3) -> usize {
    mesh.add_helper_part(name, at).unwrap()
}

/// Three parts, then the middle one deleted, so the part index has a hole.
fn holey_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    flat_diamond(&mut mesh, "a", Vector3::new(0.0, 0.0, 0.0));
    flat_diamond(&mut mesh, "b", Vector3::new(1.0, 0.0, 0.0));
    flat_diamond(&mut mesh, "c", Vector3::new(2.0, 0.0, 0.0));
    mesh.delete_part(1).unwrap();
    mesh
}

#[test]
fn order_and_slot_translate_both_ways() {
    let mut mesh = holey_mesh();
    flat_diamond(&mut mesh, "d", Vector3::new(3.0, 0.0, 0.0));
    mesh.move_up_part(2).unwrap();

    for order in 0..mesh.num_parts() {
        let slot = mesh.internal_slot_from_order(order).unwrap();
        assert_eq!(order, mesh.order_from_internal_slot(slot).unwrap());
    }
    assert!(matches!(
        mesh.internal_slot_from_order(mesh.num_parts()),
        Err(MeshError::Index { .. })
    ));
}

#[test]
fn freed_part_slot_is_reused() {
    let mut mesh = holey_mesh();
    assert_eq!(1, mesh.first_unused_part_slot());
    let order = flat_diamond(&mut mesh, "d", Vector3::new(3.0, 0.0, 0.0));
    assert_eq!(2, order);
    // Storage slot 1 was freed by the delete and is taken again.
    assert_eq!(1, mesh.internal_slot_from_order(order).unwrap());
    let names: Vec<&str> = mesh.parts().map(|p| p.name()).collect();
    assert_eq!(vec!["a", "c", "d"], names);
}

#[test]
fn operations_preserve_invariants() {
    let mut mesh = Mesh::new();
    assert_eq!(MeshValidity::EmptyValid, mesh.validate());

    let a = flat_diamond(&mut mesh, "a", Vector3::new(0.0, 1.0, 0.0));
    let b = flat_diamond(&mut mesh, "b", Vector3::new(0.0, 0.0, 5.0));
    assert_eq!(MeshValidity::Valid, mesh.validate());

    let merged = mesh.merge_parts_to_new(a, b).unwrap();
    assert_eq!(MeshValidity::Valid, mesh.validate());
    let copy = mesh.copy_own_part(merged).unwrap();
    assert_eq!(MeshValidity::Valid, mesh.validate());
    mesh.center_part(copy).unwrap();
    mesh.set_part_center(a, Vector3::new(1.0, 1.0, 1.0)).unwrap();
    mesh.move_up_part(copy).unwrap();
    mesh.delete_part(0).unwrap();
    mesh.delete_part_triangles(0, &[0, 2, 4]).unwrap();
    mesh.delete_unreferenced_vertices().unwrap();
    assert_eq!(MeshValidity::Valid, mesh.validate());

    while mesh.num_parts() > 0 {
        mesh.delete_part(0).unwrap();
    }
    assert_eq!(MeshValidity::Valid, mesh.validate());
    assert_eq!(0, mesh.num_vertices());
    assert_eq!(0, mesh.num_triangles());
}

#[test]
fn delete_and_merge_counts() {
    let mut mesh = Mesh::new();
    flat_diamond(&mut mesh, "a", Vector3::new(0.0, 0.0, 0.0));
    mesh.add_part_from_geometry(&[0, 1, 2], &[0.0; 6], &[0.0; 9], &[0.0; 9])
        .unwrap();

    let merged = mesh.merge_parts_to_new(0, 1).unwrap();
    assert_eq!(3, mesh.num_parts());
    let part = mesh.part(merged).unwrap();
    assert_eq!(9, part.num_vertices());
    assert_eq!(9, part.num_triangles());
    assert_eq!(6, mesh.part(0).unwrap().num_vertices());
    assert_eq!(3, mesh.part(1).unwrap().num_vertices());

    let (vertices, triangles) = (mesh.num_vertices(), mesh.num_triangles());
    mesh.delete_part(0).unwrap();
    assert_eq!(2, mesh.num_parts());
    assert_eq!(vertices - 6, mesh.num_vertices());
    assert_eq!(triangles - 8, mesh.num_triangles());
}

#[test]
fn sweep_removes_exactly_the_orphaned_vertex() {
    let mut mesh = Mesh::new();
    // Two triangles sharing an edge; vertex 3 is only used by the second one.
    mesh.add_part_from_geometry(
        &[0, 1, 2, 1, 3, 2],
        &[0.0; 12],
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
        &[0.0; 12],
    )
    .unwrap();
    mesh.delete_part_triangles(0, &[1]).unwrap();
    assert_eq!(4, mesh.num_vertices());

    assert_eq!(Ok(1), mesh.delete_unreferenced_vertices());
    assert_eq!(3, mesh.num_vertices());
    assert_eq!(
        vec![0, 1, 2],
        mesh.part(0).unwrap().vertices().indices().collect::<Vec<_>>()
    );
    assert_eq!(Ok(0), mesh.delete_unreferenced_vertices());
}

#[test]
fn geometry_injection_uses_new_global_indices() {
    let mut mesh = Mesh::new();
    let order = mesh
        .add_part_from_geometry(
            &[0, 1, 2],
            &[0.0; 6],
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
    assert_eq!(0, order);
    assert_eq!(1, mesh.num_parts());
    assert_eq!(1, mesh.num_triangles());
    assert_eq!(3, mesh.num_vertices());

    let part = mesh.part(order).unwrap();
    let globals: Vec<usize> = part.vertices().indices().collect();
    let triangle = mesh.part_triangles(order).unwrap()[0];
    assert_eq!([globals[0], globals[1], globals[2]], triangle.vertices);

    // A second injection continues after the vertices already in use.
    let second = mesh
        .add_part_from_geometry(&[2, 1, 0], &[0.0; 6], &[0.0; 9], &[0.0; 9])
        .unwrap();
    assert_eq!([5, 4, 3], mesh.part_triangles(second).unwrap()[0].vertices);
}

#[test]
fn move_up_first_part_is_a_no_op() {
    let mut mesh = holey_mesh();
    let before = mesh.part_index().to_vec();
    assert_eq!(Ok(0), mesh.move_up_part(0));
    assert_eq!(before, mesh.part_index());
}

#[test]
fn copy_between_meshes() -> anyhow::Result<()> {
    let mut src = Mesh::new();
    flat_diamond(&mut src, ":HB", Vector3::new(0.0, 2.0, 0.0));
    let mut dst = holey_mesh();

    let order = dst.copy_part_from(&src, 0)?;
    assert_eq!(2, order);
    let part = dst.part(order)?;
    assert_eq!(":HB", part.name());
    assert_eq!(Vector3::new(0.0, 2.0, 0.0), part.position());
    let positions = dst.part_vertex_positions(order)?;
    assert_eq!(DIAMOND_VERTICES.len(), positions.len());
    assert_eq!(Vector3::from(DIAMOND_VERTICES[0]), positions[0]);
    assert!(dst.is_valid());
    assert!(dst.copy_part_from(&src, 1).is_err());
    Ok(())
}
