//! Render pass wrapper that skips redundant state changes.
//!
//! Draw commands arrive sorted by pipeline and material, so consecutive
//! commands usually share most of their state. Callers pass a stable id
//! alongside each resource; a set call with an id that matches the one
//! already bound is dropped before it reaches wgpu.

/// One bound group plus the dynamic offsets it was bound with.
#[derive(Clone, Copy, PartialEq)]
struct BoundGroup {
    id: u64,
    // Per WebGPU defaults at most 4 dynamic offsets per set call matter here.
    offsets: [u32; 4],
    offset_count: u8,
}

pub struct TrackedRenderPass<'a> {
    pass: wgpu::RenderPass<'a>,
    pipeline_id: Option<u16>,
    bind_groups: [Option<BoundGroup>; 4],
    vertex_buffers: [Option<u64>; 8],
    index_buffer: Option<u64>,
}

impl<'a> TrackedRenderPass<'a> {
    #[must_use]
    pub fn new(pass: wgpu::RenderPass<'a>) -> Self {
        Self {
            pass,
            pipeline_id: None,
            bind_groups: [None; 4],
            vertex_buffers: [None; 8],
            index_buffer: None,
        }
    }

    pub fn set_pipeline(&mut self, id: u16, pipeline: &'a wgpu::RenderPipeline) {
        if self.pipeline_id != Some(id) {
            self.pass.set_pipeline(pipeline);
            self.pipeline_id = Some(id);
        }
    }

    pub fn set_bind_group(
        &mut self,
        index: u32,
        id: u64,
        bind_group: &'a wgpu::BindGroup,
        offsets: &[u32],
    ) {
        let slot = index as usize;
        let unchanged = self.bind_groups[slot].is_some_and(|bound| {
            bound.id == id
                && bound.offset_count as usize == offsets.len()
                && &bound.offsets[..offsets.len()] == offsets
        });
        if unchanged {
            return;
        }

        self.pass.set_bind_group(index, bind_group, offsets);

        let mut bound = BoundGroup {
            id,
            offsets: [0; 4],
            offset_count: offsets.len() as u8,
        };
        bound.offsets[..offsets.len()].copy_from_slice(offsets);
        self.bind_groups[slot] = Some(bound);
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, id: u64, slice: wgpu::BufferSlice<'a>) {
        if self.vertex_buffers[slot as usize] != Some(id) {
            self.pass.set_vertex_buffer(slot, slice);
            self.vertex_buffers[slot as usize] = Some(id);
        }
    }

    pub fn set_index_buffer(
        &mut self,
        id: u64,
        slice: wgpu::BufferSlice<'a>,
        format: wgpu::IndexFormat,
    ) {
        if self.index_buffer != Some(id) {
            self.pass.set_index_buffer(slice, format);
            self.index_buffer = Some(id);
        }
    }

    pub fn draw(&mut self, vertices: std::ops::Range<u32>, instances: std::ops::Range<u32>) {
        self.pass.draw(vertices, instances);
    }

    pub fn draw_indexed(
        &mut self,
        indices: std::ops::Range<u32>,
        base_vertex: i32,
        instances: std::ops::Range<u32>,
    ) {
        self.pass.draw_indexed(indices, base_vertex, instances);
    }
}
