//! End-to-end scenarios driven against the mock backend, covering
//! properties that span more than one module (device, queue, command
//! buffer, pipeline) and so don't fit naturally in any single module's
//! `#[cfg(test)]` block.

use rhi::{
    CommandBufferState, CommandPoolDesc, ComputePipelineDesc, Diagnostics, Error,
    GraphicsPipelineDesc, PipelineSlot, QueueRequest, QueueType, ShaderModuleDesc, ShaderStage,
    Status, SubmitInfo, SwapchainDesc, SwapchainFlags, WaitOutcome, INFINITE_TIMEOUT,
};
use raw_window_handle::RawWindowHandle;

fn open_device(queues: &[QueueRequest]) -> rhi::Device {
    let adapters = rhi_backend_empty::enumerate_adapters(1).unwrap();
    let adapter = adapters.into_iter().next().unwrap();
    let desc = rhi::DeviceDesc {
        adapter: &adapter,
        queues,
        enable_api_validation: false,
        debug_callback: None,
        allocation_callback: None,
    };
    rhi_backend_empty::create_device(Diagnostics::default(), &desc).unwrap()
}

#[test]
fn triangle_frame_loop_end_to_end() {
    let device = open_device(&[QueueRequest {
        queue_type: QueueType::Graphics,
        count: 1,
    }]);
    let queue = device.queue(QueueType::Graphics, 0).unwrap();

    let layout = device.create_pipeline_layout(&Default::default()).unwrap();
    let vertex = ShaderModuleDesc {
        stage: ShaderStage::Vertex,
        bytecode: &[0u8; 4],
        entry_point: "main",
    };
    let pipeline = device
        .create_graphics_pipeline(&GraphicsPipelineDesc {
            layout: Some(&layout),
            shaders: std::slice::from_ref(&vertex),
            input_assembly_state: Default::default(),
            rasterization_state: Default::default(),
            depth_stencil_state: Default::default(),
            blend_state: Default::default(),
        })
        .unwrap();

    let pool = device
        .create_command_pool(CommandPoolDesc {
            queue_type: QueueType::Graphics,
            ..Default::default()
        })
        .unwrap();
    let cmd = pool.allocate().unwrap();
    let fence = device.create_fence(0).unwrap();

    cmd.begin().unwrap();
    rhi::bind_pipeline(&cmd, &pipeline).unwrap();
    cmd.end().unwrap();
    assert_eq!(cmd.state(), CommandBufferState::Executable);

    queue
        .submit(&[SubmitInfo {
            wait: &[],
            command_buffers: &[cmd.clone()],
            signal: &[(&fence, 1)],
        }])
        .unwrap();
    assert_eq!(cmd.state(), CommandBufferState::Pending);

    let outcome = rhi::wait_many(&[&fence], &[1], true, INFINITE_TIMEOUT).unwrap();
    assert_eq!(outcome, WaitOutcome::Signaled);
}

#[test]
fn submitted_command_buffer_cannot_be_rerecorded_without_a_reset() {
    let device = open_device(&[QueueRequest {
        queue_type: QueueType::Graphics,
        count: 1,
    }]);
    let queue = device.queue(QueueType::Graphics, 0).unwrap();
    let pool = device
        .create_command_pool(CommandPoolDesc::default())
        .unwrap();
    let cmd = pool.allocate().unwrap();
    let fence = device.create_fence(0).unwrap();

    cmd.begin().unwrap();
    cmd.end().unwrap();
    assert_eq!(cmd.state(), CommandBufferState::Executable);

    queue
        .submit(&[SubmitInfo {
            wait: &[],
            command_buffers: &[cmd.clone()],
            signal: &[(&fence, 1)],
        }])
        .unwrap();
    // `submit` marks an executed buffer Pending; re-recording it without an
    // explicit reset is rejected, unlike the Initial/Executable -> Recording
    // transition `begin` otherwise allows.
    assert_eq!(cmd.state(), CommandBufferState::Pending);
    assert!(matches!(cmd.begin(), Err(Error::InvalidApiUsage(_))));

    cmd.reset().unwrap();
    assert_eq!(cmd.state(), CommandBufferState::Initial);
    cmd.begin().unwrap();
    assert_eq!(cmd.state(), CommandBufferState::Recording);
}

#[test]
fn compute_pipeline_rejects_graphics_only_slots() {
    let device = open_device(&[QueueRequest {
        queue_type: QueueType::Compute,
        count: 1,
    }]);
    let pool = device
        .create_command_pool(CommandPoolDesc {
            queue_type: QueueType::Compute,
            ..Default::default()
        })
        .unwrap();
    let cmd = pool.allocate().unwrap();

    let compute_shader = ShaderModuleDesc {
        stage: ShaderStage::Compute,
        bytecode: &[0u8; 4],
        entry_point: "main",
    };
    let pipeline = device
        .create_compute_pipeline(&ComputePipelineDesc {
            layout: None,
            shader: compute_shader,
        })
        .unwrap();
    assert!(pipeline.is_compute());

    cmd.begin().unwrap();
    rhi::bind_pipeline(&cmd, &pipeline).unwrap();
    // A compute pipeline reports no identity for graphics-only slots, so
    // binding it never touches rasterizer/topology state.
    assert_eq!(pipeline.backend().slot_key(PipelineSlot::RasterizerState), None);
    assert!(pipeline.backend().slot_key(PipelineSlot::ComputeShader).is_some());
}

#[test]
fn rebinding_the_same_pipeline_is_a_no_op_for_every_slot() {
    let device = open_device(&[QueueRequest {
        queue_type: QueueType::Graphics,
        count: 1,
    }]);
    let pool = device
        .create_command_pool(CommandPoolDesc::default())
        .unwrap();
    let cmd = pool.allocate().unwrap();
    let vertex = ShaderModuleDesc {
        stage: ShaderStage::Vertex,
        bytecode: &[0u8; 4],
        entry_point: "main",
    };
    let pipeline = device
        .create_graphics_pipeline(&GraphicsPipelineDesc {
            layout: None,
            shaders: std::slice::from_ref(&vertex),
            input_assembly_state: Default::default(),
            rasterization_state: Default::default(),
            depth_stencil_state: Default::default(),
            blend_state: Default::default(),
        })
        .unwrap();

    cmd.begin().unwrap();
    rhi::bind_pipeline(&cmd, &pipeline).unwrap();
    // Binding the identical pipeline a second time must still succeed (the
    // filter just finds nothing changed; it never errors on "no-op").
    rhi::bind_pipeline(&cmd, &pipeline).unwrap();
}

#[test]
fn four_frame_loop_with_staggered_fence_waits() {
    // A literal replay of the acquire/submit/present cycle an application
    // actually drives: two fences (image-available, frame-complete), two
    // command buffers reused round-robin, waiting on the frame-before-last
    // once the loop is far enough in to need the backpressure.
    let device = open_device(&[
        QueueRequest {
            queue_type: QueueType::Graphics,
            count: 1,
        },
        QueueRequest {
            queue_type: QueueType::Present,
            count: 1,
        },
    ]);
    let graphics = device.queue(QueueType::Graphics, 0).unwrap();
    let present_queue = device.queue(QueueType::Present, 0).unwrap();

    let swapchain = device
        .create_swapchain(SwapchainDesc {
            window: RawWindowHandle::Windows(raw_window_handle::WindowsHandle::empty()),
            texture_count: 2,
            format: rhi::Format::Rgba8Unorm,
            color_space: rhi::ColorSpace::SrgbNonlinear,
            flags: SwapchainFlags::VSYNC,
            frames_in_flight: 0,
        })
        .unwrap();

    let pool = device
        .create_command_pool(CommandPoolDesc {
            queue_type: QueueType::Graphics,
            ..CommandPoolDesc::default()
        })
        .unwrap();
    let command_buffers = [pool.allocate().unwrap(), pool.allocate().unwrap()];

    let image_available = device.create_fence(0).unwrap();
    let frame_fence = device.create_fence(0).unwrap();

    let mut acquire_counter = 0u64;
    let mut complete_counter = 0u64;

    for frame_number in 0..4u64 {
        if frame_number >= 2 {
            let outcome =
                rhi::wait_many(&[&frame_fence], &[frame_number - 1], true, INFINITE_TIMEOUT).unwrap();
            assert_eq!(outcome, WaitOutcome::Signaled);
        }

        acquire_counter += 1;
        let index = swapchain
            .acquire_next_image(&image_available, acquire_counter)
            .unwrap();

        let cmd = &command_buffers[(frame_number % 2) as usize];
        // `reset` is legal (and a no-op) from any state, including the
        // first pass where the buffer is still Initial.
        cmd.reset().unwrap();
        cmd.begin().unwrap();
        cmd.end().unwrap();

        complete_counter += 1;
        graphics
            .submit(&[SubmitInfo {
                wait: &[(&image_available, acquire_counter)],
                command_buffers: &[cmd.clone()],
                signal: &[(&frame_fence, complete_counter)],
            }])
            .unwrap();

        let results = present_queue
            .present(&[(&frame_fence, complete_counter)], &[&swapchain], &[])
            .unwrap();
        assert_eq!(results, vec![Status::Success]);
        let _ = index;
    }

    assert!(frame_fence.get_value().unwrap() >= 4);
}

#[test]
fn present_occluded_swapchain_reports_suboptimal_without_erroring() {
    let device = open_device(&[QueueRequest {
        queue_type: QueueType::Present,
        count: 1,
    }]);
    let queue = device.queue(QueueType::Present, 0).unwrap();

    let swapchain = device
        .create_swapchain(SwapchainDesc {
            window: RawWindowHandle::Windows(raw_window_handle::WindowsHandle::empty()),
            texture_count: 2,
            format: rhi::Format::Bgra8Unorm,
            color_space: rhi::ColorSpace::SrgbNonlinear,
            flags: SwapchainFlags::empty(),
            frames_in_flight: 0,
        })
        .unwrap();

    let fence = device.create_fence(0).unwrap();
    let index = swapchain.acquire_next_image(&fence, 1).unwrap();
    let _back_buffer = swapchain.back_buffer(index);

    let backend = swapchain
        .backend()
        .as_any()
        .downcast_ref::<rhi_backend_empty::MockSwapchain>()
        .unwrap();
    backend.force_occluded_once();

    let results = queue.present(&[(&fence, 1)], &[&swapchain], &[]).unwrap();
    assert_eq!(results, vec![Status::Suboptimal]);

    // The swapchain remains usable, and the surface recovering is reported
    // as an ordinary successful present on the next call.
    let results = queue.present(&[], &[&swapchain], &[]).unwrap();
    assert_eq!(results, vec![Status::Success]);
}
