use glam::{Vec2, Vec3};
use strata_config::TerrainSettings;
use strata_mesh::Color;
use strata_terrain::*;

fn settings() -> TerrainSettings {
    TerrainSettings {
        size: 8,
        ..Default::default()
    }
}

/// World position of the first point of the quad at `(row, col)`'s first triangle.
fn corner(mesh: &strata_mesh::Mesh, n: usize, row: usize, col: usize) -> Vec3 {
    mesh.to_world(mesh.faces[2 * (row * n + col)].points[0])
}

#[test]
fn test_reruns_are_identical() {
    let a = Terraformer::with_default_biomes(settings(), 1234).unwrap();
    let b = Terraformer::with_default_biomes(settings(), 1234).unwrap();
    for coord in ChunkCoord::new(0, 0).square(2) {
        assert_eq!(a.generate_chunk(coord).unwrap(), b.generate_chunk(coord).unwrap(), "chunk {coord}");
    }
}

#[test]
fn test_different_seeds_give_different_terrain() {
    let a = Terraformer::with_default_biomes(settings(), 1).unwrap();
    let b = Terraformer::with_default_biomes(settings(), 2).unwrap();
    let coord = ChunkCoord::new(4, 4);
    assert_ne!(a.generate_chunk(coord).unwrap(), b.generate_chunk(coord).unwrap());
}

#[test]
fn test_neighbouring_chunks_share_edges() {
    let terrain = Terraformer::with_default_biomes(settings(), 99).unwrap();
    let n = settings().size as usize;
    let left = terrain.generate_chunk(ChunkCoord::new(0, 0)).unwrap();
    let right = terrain.generate_chunk(ChunkCoord::new(1, 0)).unwrap();
    let below = terrain.generate_chunk(ChunkCoord::new(0, 1)).unwrap();

    for i in 0..n {
        // Quad (r, c) lists vertex (r + 1, c) second and (r, c + 1) third.
        let left_edge = left.to_world(left.faces[2 * (i * n + n - 1)].points[2]);
        assert_eq!(left_edge, corner(&right, n, i, 0), "x seam row {i}");

        let bottom_edge = left.to_world(left.faces[2 * ((n - 1) * n + i)].points[1]);
        assert_eq!(bottom_edge, corner(&below, n, 0, i), "z seam col {i}");
    }
}

#[test]
fn test_biome_order_is_observable() {
    let field = || Perlin::new(0, [8, 8]).unwrap();
    let set = || {
        Biome::new("set", Color::WHITE, field())
            .applies_when(|_, _| true)
            .places(|_, _, column| column.height = 10.0)
    };
    let double = || {
        Biome::new("double", Color::WHITE, field())
            .applies_when(|_, _| true)
            .places(|_, _, column| column.height *= 2.0)
    };

    let forward = TerraformerBuilder::new(settings(), 0)
        .biome(set())
        .biome(double())
        .build()
        .unwrap();
    let reversed = TerraformerBuilder::new(settings(), 0)
        .biomes([double(), set()])
        .build()
        .unwrap();

    assert_eq!(forward.column_at(Vec2::ZERO).height, 20.0);
    assert_eq!(reversed.column_at(Vec2::ZERO).height, 10.0);
}

#[test]
fn test_chunk_lookup_round_trip() {
    let terrain = Terraformer::with_default_biomes(TerrainSettings::default(), 0).unwrap();
    let coord = terrain.to_chunk(Vec3::new(160.0, 12.0, 0.0)).unwrap();
    assert_eq!(coord, ChunkCoord::new(10, 0));
    let mesh = terrain.generate_chunk(coord).unwrap();
    assert_eq!(mesh.center, terrain.to_position(coord));
    assert_eq!(ChunkCoord::unpack(mesh.extra), coord);
}

#[test]
fn test_generation_is_deterministic_across_threads() {
    let terrain = std::sync::Arc::new(Terraformer::with_default_biomes(settings(), 5).unwrap());
    let coord = ChunkCoord::new(-3, 7);
    let expected = terrain.generate_chunk(coord).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let terrain = std::sync::Arc::clone(&terrain);
            std::thread::spawn(move || terrain.generate_chunk(coord).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
